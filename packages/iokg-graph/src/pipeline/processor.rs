//! Per-document orchestration: parse → signals → graph

use rayon::prelude::*;
use tracing::info;

use iokg_signals::{compute_signals_with, parse_document_with, ParseOptions};

use crate::domain::GraphArtifact;
use crate::error::Result;
use crate::infrastructure::GraphAssembler;

/// Run the full pipeline on one document with default options
pub fn process_document(text: &str) -> Result<GraphArtifact> {
    process_document_with(text, ParseOptions::default())
}

/// Run the full pipeline on one document
pub fn process_document_with(text: &str, options: ParseOptions) -> Result<GraphArtifact> {
    let parsed = parse_document_with(text, options)?;
    let report = compute_signals_with(&parsed, options.shared_rank);
    let artifact = GraphAssembler::new().assemble(&parsed, &report);
    info!(
        entities = artifact.entities.len(),
        relationships = artifact.relationships.len(),
        "processed document"
    );
    Ok(artifact)
}

/// Fan out over a batch of documents. Failures stay per-element; one
/// malformed document never aborts the batch.
pub fn process_documents(texts: &[&str]) -> Vec<Result<GraphArtifact>> {
    texts.par_iter().map(|text| process_document(text)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use iokg_signals::SignalError;

    #[test]
    fn test_batch_failures_are_per_element() {
        let good = "# jobid: 1\n# POSIX module data\nPOSIX\t0\tr\tPOSIX_READS\t3\n";
        let bad = "no header at all";
        let results = process_documents(&[good, bad, good]);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(GraphError::Signal(SignalError::MissingHeader))
        ));
        assert!(results[2].is_ok());
    }
}

//! Parsing domain models

use crate::shared::models::{CounterTable, JobMetadata, MountTable};

/// Parser configuration
///
/// The "unmonitored" sentinel convention is not fully pinned down by
/// the source documentation, so it is a predicate over
/// `(counter_name, integer_value)` rather than a hard-coded constant.
/// The default treats `-1` as unmonitored for every counter.
#[derive(Clone, Copy)]
pub struct ParseOptions {
    /// Classifies an integer counter value as the unmonitored sentinel
    pub unmonitored: fn(counter: &str, value: i64) -> bool,
    /// Rank value marking a shared-file (cross-rank) record
    pub shared_rank: i64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            unmonitored: |_, value| value == -1,
            shared_rank: -1,
        }
    }
}

impl std::fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseOptions")
            .field("shared_rank", &self.shared_rank)
            .finish_non_exhaustive()
    }
}

/// Output of one document parse
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    pub job: JobMetadata,
    pub mounts: MountTable,
    pub counters: CounterTable,
    /// Module sections in order of first appearance
    pub module_sections: Vec<String>,
    /// Non-comment lines that could not be parsed (non-fatal)
    pub skipped_lines: usize,
}

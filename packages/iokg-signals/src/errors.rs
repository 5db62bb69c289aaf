//! Error types for iokg-signals
//!
//! Only two failure classes are document-fatal: a log with no
//! recognizable header and a log with no module sections. Everything
//! else (bad lines, missing counters) degrades locally and is
//! reported through skip counters or NA signal values.

use thiserror::Error;

/// Main error type for counter-log parsing and signal extraction
#[derive(Debug, Error)]
pub enum SignalError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document carries no recognizable header fields
    #[error("missing header: no job metadata fields found")]
    MissingHeader,

    /// Document carries no module sections
    #[error("empty document: no module sections found")]
    EmptyDocument,
}

/// Result type alias for signal operations
pub type Result<T> = std::result::Result<T, SignalError>;

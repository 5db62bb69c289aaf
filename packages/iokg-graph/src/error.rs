//! Error types for graph assembly

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("signal extraction failed: {0}")]
    Signal(#[from] iokg_signals::SignalError),

    #[error("artifact serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

//! Shared models

mod counter;
mod job;
mod signal;

pub use counter::{CounterTable, CounterValue, Fetched, RecordEntry, RecordKey, RecordMeta};
pub use job::{JobMetadata, MountTable};
pub use signal::{NaReason, Signal, SignalSet};

/// Sidecar sentinel for file/mount/fs metadata the log did not carry
pub const UNKNOWN: &str = "UNKNOWN";

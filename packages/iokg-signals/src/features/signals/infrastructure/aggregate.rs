//! Module- and job-tier aggregation
//!
//! Aggregates accumulate only `Present` values from record signals, so
//! an unavailable record input never leaks into a sum as zero-that-
//! means-NA; a genuine zero still contributes normally.

use serde::Serialize;

use crate::shared::models::{NaReason, Signal, SignalSet};

const MIB: f64 = 1024.0 * 1024.0;

/// Byte, operation, and time totals over one module's records
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ModuleAggregates {
    pub total_bytes_read: f64,
    pub total_bytes_written: f64,
    pub total_reads: f64,
    pub total_writes: f64,
    pub total_read_time: f64,
    pub total_write_time: f64,
}

impl ModuleAggregates {
    pub fn accumulate(&mut self, signals: &SignalSet) {
        let mut add = |name: &str, slot: &mut f64| {
            if let Some(Signal::Present(v)) = signals.get(name) {
                *slot += v;
            }
        };
        add("bytes_read", &mut self.total_bytes_read);
        add("bytes_written", &mut self.total_bytes_written);
        add("reads", &mut self.total_reads);
        add("writes", &mut self.total_writes);
        add("read_time", &mut self.total_read_time);
        add("write_time", &mut self.total_write_time);
    }

    /// Evaluate the module-tier formula table over these totals
    pub fn signals(&self) -> SignalSet {
        MODULE_FORMULAS
            .iter()
            .map(|(name, eval)| (name.to_string(), eval(self)))
            .collect()
    }
}

/// Module-tier performance formulas, the record performance family
/// re-expressed over module-wide sums
pub static MODULE_FORMULAS: &[(&str, fn(&ModuleAggregates) -> Signal)] = &[
    ("read_bw", |a| {
        if a.total_read_time > 0.0 {
            Signal::Present(a.total_bytes_read / MIB / a.total_read_time)
        } else {
            Signal::Unavailable(NaReason::NoReadTime)
        }
    }),
    ("write_bw", |a| {
        if a.total_write_time > 0.0 {
            Signal::Present(a.total_bytes_written / MIB / a.total_write_time)
        } else {
            Signal::Unavailable(NaReason::NoWriteTime)
        }
    }),
    ("read_iops", |a| {
        if a.total_read_time > 0.0 {
            Signal::Present(a.total_reads / a.total_read_time)
        } else {
            Signal::Unavailable(NaReason::NoReadTime)
        }
    }),
    ("write_iops", |a| {
        if a.total_write_time > 0.0 {
            Signal::Present(a.total_writes / a.total_write_time)
        } else {
            Signal::Unavailable(NaReason::NoWriteTime)
        }
    }),
    ("avg_read_size", |a| {
        Signal::div(a.total_bytes_read, a.total_reads, NaReason::NoReads)
    }),
    ("avg_write_size", |a| {
        Signal::div(a.total_bytes_written, a.total_writes, NaReason::NoWrites)
    }),
];

/// Byte and operation totals over every byte-stream module
///
/// No rates at this tier: time totals from different interface layers
/// overlap in wall-clock and a quotient over them would be fiction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JobAggregates {
    pub total_bytes_read: f64,
    pub total_bytes_written: f64,
    pub total_reads: f64,
    pub total_writes: f64,
}

impl JobAggregates {
    pub fn accumulate(&mut self, module: &ModuleAggregates) {
        self.total_bytes_read += module.total_bytes_read;
        self.total_bytes_written += module.total_bytes_written;
        self.total_reads += module.total_reads;
        self.total_writes += module.total_writes;
    }
}

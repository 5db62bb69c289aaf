//! Derived signal values
//!
//! A signal is either a finite number or an explicit "unavailable"
//! carrying a reason from a closed set. A disqualified formula is
//! never coerced to zero; zero always means the measurement was zero.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Closed set of reasons a signal can be unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NaReason {
    /// Counter was written as the "not monitored" sentinel
    NotMonitored,
    /// Counter never appeared on the record
    NotAvailable,
    MissingTimestamp,
    MissingTimeCounter,
    ZeroSpan,
    /// An input signal this formula depends on was itself unavailable
    DependencyMissing,
    NoReads,
    NoWrites,
    NoReadTime,
    NoWriteTime,
    NoTime,
    NoIo,
    NoBytes,
    /// Rank is not the shared-file sentinel
    NotSharedFile,
    NoFileSize,
    NoFastestBytes,
    NoActivity,
    NoBinWidth,
}

impl NaReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NaReason::NotMonitored => "not_monitored",
            NaReason::NotAvailable => "not_available",
            NaReason::MissingTimestamp => "missing_timestamp",
            NaReason::MissingTimeCounter => "missing_time_counter",
            NaReason::ZeroSpan => "zero_span",
            NaReason::DependencyMissing => "dependency_missing",
            NaReason::NoReads => "no_reads",
            NaReason::NoWrites => "no_writes",
            NaReason::NoReadTime => "no_read_time",
            NaReason::NoWriteTime => "no_write_time",
            NaReason::NoTime => "no_time",
            NaReason::NoIo => "no_io",
            NaReason::NoBytes => "no_bytes",
            NaReason::NotSharedFile => "not_shared_file",
            NaReason::NoFileSize => "no_file_size",
            NaReason::NoFastestBytes => "no_fastest_bytes",
            NaReason::NoActivity => "no_activity",
            NaReason::NoBinWidth => "no_bin_width",
        }
    }
}

impl fmt::Display for NaReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A derived signal value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    Present(f64),
    Unavailable(NaReason),
}

impl Signal {
    pub fn value(&self) -> Option<f64> {
        match self {
            Signal::Present(v) => Some(*v),
            Signal::Unavailable(_) => None,
        }
    }

    pub fn reason(&self) -> Option<NaReason> {
        match self {
            Signal::Present(_) => None,
            Signal::Unavailable(r) => Some(*r),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Signal::Present(_))
    }

    /// Guarded division: a zero denominator yields the given reason
    pub fn div(num: f64, den: f64, reason: NaReason) -> Signal {
        if den == 0.0 {
            Signal::Unavailable(reason)
        } else {
            Signal::Present(num / den)
        }
    }
}

/// Named signals for one record / module / job tier, ordered for
/// deterministic emission
pub type SignalSet = BTreeMap<String, Signal>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_guards_zero_denominator() {
        assert_eq!(
            Signal::div(10.0, 0.0, NaReason::NoReads),
            Signal::Unavailable(NaReason::NoReads)
        );
        assert_eq!(Signal::div(10.0, 4.0, NaReason::NoReads), Signal::Present(2.5));
    }

    #[test]
    fn test_reason_strings_are_snake_case() {
        assert_eq!(NaReason::NotSharedFile.as_str(), "not_shared_file");
        assert_eq!(NaReason::NoFastestBytes.as_str(), "no_fastest_bytes");
    }
}

//! # iokg-signals
//!
//! Parses I/O instrumentation counter dumps and derives performance
//! signals from them at three tiers:
//!
//! - **Record**: one instrumented (module, rank, record) triple
//! - **Module**: totals over one interface layer's records, with the
//!   rate formulas re-evaluated over the sums
//! - **Job**: byte and operation totals across all modules
//!
//! Missing measurements stay explicit: a disqualified formula yields
//! [`Signal::Unavailable`] with a reason code, never a silent zero.
//!
//! ```
//! use iokg_signals::{compute_signals, parse_document};
//!
//! let log = "\
//! ## darshan log version: 3.41
//! ## jobid: 42
//! ## POSIX module data
//! POSIX\t0\t7\tPOSIX_BYTES_READ\t4096\t/data/in.h5\t/data\tlustre
//! POSIX\t0\t7\tPOSIX_READS\t4\t/data/in.h5\t/data\tlustre
//! ";
//! let parsed = parse_document(log).unwrap();
//! let report = compute_signals(&parsed);
//! assert_eq!(report.job.total_bytes_read, 4096.0);
//! ```

pub mod errors;
pub mod features;
pub mod shared;

pub use errors::{Result, SignalError};
pub use features::parsing::{
    parse_document, parse_document_with, ParseLogUseCase, ParseOptions, ParsedLog,
};
pub use features::signals::{
    compute_signals, compute_signals_with, evaluate_record, ComputeSignalsUseCase, FormulaScope,
    FormulaSpec, HeatmapProfile, JobAggregates, ModuleAggregates, ModuleKind, ModuleReport,
    RecordInputs, SignalReport, Tier, MODULE_FORMULAS, RECORD_FORMULAS,
};
pub use shared::models::{
    CounterTable, CounterValue, Fetched, JobMetadata, MountTable, NaReason, RecordEntry, RecordKey,
    RecordMeta, Signal, SignalSet, UNKNOWN,
};

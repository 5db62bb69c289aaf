//! Signal Computation Feature
//!
//! Evaluates the fixed formula table over the counter table at three
//! tiers (Record, Module, Job). Every signal is a pure function of
//! `(tier, module, inputs)`; disqualified formulas resolve to an
//! explicit NA reason, never to zero and never to an error.
//!
//! ## Structure
//! - `domain/` - module/tier classification, record inputs, the formula table
//! - `application/` - ComputeSignalsUseCase
//! - `infrastructure/` - record evaluation and module/job aggregation

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-exports
pub use application::{compute_signals, compute_signals_with, ComputeSignalsUseCase, ModuleReport, SignalReport};
pub use domain::{FormulaScope, FormulaSpec, HeatmapProfile, ModuleKind, RecordInputs, Tier, RECORD_FORMULAS};
pub use infrastructure::{evaluate_record, JobAggregates, ModuleAggregates, MODULE_FORMULAS};

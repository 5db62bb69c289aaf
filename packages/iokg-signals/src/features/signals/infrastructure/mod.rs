//! Signal evaluation infrastructure

mod aggregate;
mod record;

pub use aggregate::{JobAggregates, ModuleAggregates, MODULE_FORMULAS};
pub use record::evaluate_record;

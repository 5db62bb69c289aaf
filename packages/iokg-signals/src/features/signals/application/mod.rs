//! Signal computation use case

use std::collections::BTreeMap;

use tracing::debug;

use crate::features::parsing::domain::ParsedLog;
use crate::features::signals::domain::ModuleKind;
use crate::features::signals::infrastructure::{
    evaluate_record, JobAggregates, ModuleAggregates,
};
use crate::shared::models::{RecordKey, SignalSet};

/// One module's tier: totals plus the rate formulas over them.
///
/// `aggregates` is `None` for modules outside the byte-stream family
/// (HEATMAP histograms have nothing meaningful to sum).
#[derive(Debug, Clone, Default)]
pub struct ModuleReport {
    pub aggregates: Option<ModuleAggregates>,
    pub signals: SignalSet,
}

/// All three signal tiers for one parsed document
#[derive(Debug, Clone, Default)]
pub struct SignalReport {
    pub records: BTreeMap<RecordKey, SignalSet>,
    pub modules: BTreeMap<String, ModuleReport>,
    pub job: JobAggregates,
}

/// Use case evaluating the formula tables over a counter table
#[derive(Debug, Clone, Copy)]
pub struct ComputeSignalsUseCase {
    /// Rank value marking a shared-file record
    pub shared_rank: i64,
}

impl Default for ComputeSignalsUseCase {
    fn default() -> Self {
        Self { shared_rank: -1 }
    }
}

impl ComputeSignalsUseCase {
    pub fn new(shared_rank: i64) -> Self {
        Self { shared_rank }
    }

    pub fn execute(&self, parsed: &ParsedLog) -> SignalReport {
        let mut report = SignalReport::default();

        for (key, entry) in parsed.counters.iter() {
            let signals = evaluate_record(key, entry, self.shared_rank);
            let kind = ModuleKind::classify(&key.module);

            let module = report.modules.entry(key.module.clone()).or_default();
            if kind.is_byte_stream() {
                module
                    .aggregates
                    .get_or_insert_with(ModuleAggregates::default)
                    .accumulate(&signals);
            }

            report.records.insert(key.clone(), signals);
        }

        for module in report.modules.values_mut() {
            if let Some(aggregates) = &module.aggregates {
                module.signals = aggregates.signals();
                report.job.accumulate(aggregates);
            }
        }

        debug!(
            records = report.records.len(),
            modules = report.modules.len(),
            "computed signal tiers"
        );
        report
    }
}

/// Compute all tiers with the default shared-rank sentinel
pub fn compute_signals(parsed: &ParsedLog) -> SignalReport {
    ComputeSignalsUseCase::default().execute(parsed)
}

/// Compute all tiers with an explicit shared-rank sentinel
pub fn compute_signals_with(parsed: &ParsedLog, shared_rank: i64) -> SignalReport {
    ComputeSignalsUseCase::new(shared_rank).execute(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::parsing::parse_document;
    use crate::shared::models::{NaReason, Signal};

    const TWO_MODULE_LOG: &str = "\
# darshan log version: 3.41
# jobid: 77
# nprocs: 4
# POSIX module data
POSIX\t0\t1001\tPOSIX_BYTES_READ\t2097152\t/data/a.h5\t/data\tlustre
POSIX\t0\t1001\tPOSIX_READS\t4\t/data/a.h5\t/data\tlustre
POSIX\t0\t1001\tPOSIX_F_READ_TIME\t2.0\t/data/a.h5\t/data\tlustre
# STDIO module data
STDIO\t1\t2002\tSTDIO_BYTES_WRITTEN\t512\t/out/log.txt\t/out\text4
STDIO\t1\t2002\tSTDIO_WRITES\t2\t/out/log.txt\t/out\text4
";

    #[test]
    fn test_tiers_over_two_modules() {
        let parsed = parse_document(TWO_MODULE_LOG).unwrap();
        let report = compute_signals(&parsed);

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.modules.len(), 2);

        let posix = &report.modules["POSIX"];
        let aggregates = posix.aggregates.as_ref().unwrap();
        assert_eq!(aggregates.total_bytes_read, 2097152.0);
        assert_eq!(aggregates.total_read_time, 2.0);
        assert_eq!(posix.signals["read_bw"], Signal::Present(1.0));
        assert_eq!(posix.signals["read_iops"], Signal::Present(2.0));

        let stdio = &report.modules["STDIO"];
        assert_eq!(
            stdio.signals["write_bw"],
            Signal::Unavailable(NaReason::NoWriteTime)
        );
        assert_eq!(stdio.signals["avg_write_size"], Signal::Present(256.0));

        // job totals cross module namespaces, no rates
        assert_eq!(report.job.total_bytes_read, 2097152.0);
        assert_eq!(report.job.total_bytes_written, 512.0);
        assert_eq!(report.job.total_reads, 4.0);
        assert_eq!(report.job.total_writes, 2.0);
    }

    #[test]
    fn test_heatmap_module_has_no_aggregates() {
        let log = "\
# darshan log version: 3.41
# jobid: 9
# HEATMAP module data
HEATMAP\t0\t5\tHEATMAP_F_BIN_WIDTH_SECONDS\t1.0\tHEATMAP_0\tUNKNOWN\tUNKNOWN
HEATMAP\t0\t5\tHEATMAP_READ_BIN_0\t6\tHEATMAP_0\tUNKNOWN\tUNKNOWN
";
        let parsed = parse_document(log).unwrap();
        let report = compute_signals(&parsed);

        let heatmap = &report.modules["HEATMAP"];
        assert!(heatmap.aggregates.is_none());
        assert!(heatmap.signals.is_empty());
        assert_eq!(report.job.total_bytes_read, 0.0);
    }
}

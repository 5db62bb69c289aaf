//! End-to-end tests over the parse → signal pipeline

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use iokg_signals::{
    compute_signals, evaluate_record, parse_document, HeatmapProfile, ModuleKind, NaReason,
    RecordEntry, RecordInputs, RecordKey, Signal, RECORD_FORMULAS,
};

const SHARED_LOG: &str = "\
# darshan log version: 3.41
# exe: /apps/bin/simulation
# jobid: 4242
# uid: 1000
# nprocs: 8
# run time: 300
# start_time: 1700000000
# end_time: 1700000300
# mount entry: /scratch lustre
# POSIX module data
POSIX\t-1\t900100\tPOSIX_BYTES_READ\t1048576\t/scratch/shared.h5\t/scratch\tlustre
POSIX\t-1\t900100\tPOSIX_READS\t16\t/scratch/shared.h5\t/scratch\tlustre
POSIX\t-1\t900100\tPOSIX_F_READ_TIME\t4.0\t/scratch/shared.h5\t/scratch\tlustre
POSIX\t-1\t900100\tPOSIX_FASTEST_RANK_BYTES\t65536\t/scratch/shared.h5\t/scratch\tlustre
POSIX\t-1\t900100\tPOSIX_SLOWEST_RANK_BYTES\t262144\t/scratch/shared.h5\t/scratch\tlustre
POSIX\t-1\t900100\tPOSIX_F_FASTEST_RANK_TIME\t1.0\t/scratch/shared.h5\t/scratch\tlustre
POSIX\t-1\t900100\tPOSIX_F_SLOWEST_RANK_TIME\t4.0\t/scratch/shared.h5\t/scratch\tlustre
POSIX\t3\t900200\tPOSIX_BYTES_READ\t1198\t/scratch/rank3.dat\t/scratch\tlustre
POSIX\t3\t900200\tPOSIX_READS\t2\t/scratch/rank3.dat\t/scratch\tlustre
";

#[test]
fn test_every_formula_is_total_on_an_empty_record() {
    // An empty record must classify cleanly under every module family:
    // each applicable formula resolves to a value or a reason, and
    // evaluation never panics on absent counters.
    let entry = RecordEntry::default();
    for kind in [
        ModuleKind::Posix,
        ModuleKind::Stdio,
        ModuleKind::Mpiio,
        ModuleKind::Heatmap,
    ] {
        let inputs = RecordInputs::new(kind, 0, -1, &entry);
        for spec in RECORD_FORMULAS {
            if !spec.scope.applies_to(kind) {
                continue;
            }
            match (spec.eval)(&inputs) {
                Signal::Present(v) => assert!(v.is_finite(), "{} not finite", spec.name),
                Signal::Unavailable(_) => {}
            }
        }
    }
}

#[test]
fn test_read_only_record_classification() {
    let key = RecordKey::new("POSIX", 3, "900200");
    let parsed = parse_document(SHARED_LOG).unwrap();
    let entry = parsed.counters.get(&key).unwrap();
    let signals = evaluate_record(&key, entry, -1);

    assert_eq!(signals["avg_read_size"], Signal::Present(599.0));
    assert_eq!(signals["read_bw"], Signal::Unavailable(NaReason::NoReadTime));
    assert_eq!(
        signals["avg_write_size"],
        Signal::Unavailable(NaReason::NoWrites)
    );
    // per-rank record: the whole shared-file family is gated off
    assert_eq!(
        signals["rank_imbalance_ratio"],
        Signal::Unavailable(NaReason::NotSharedFile)
    );
    assert_eq!(
        signals["fastest_rank_time"],
        Signal::Unavailable(NaReason::NotSharedFile)
    );
    assert_eq!(signals["is_shared"], Signal::Present(0.0));
}

#[test]
fn test_shared_record_imbalance_family() {
    let key = RecordKey::new("POSIX", -1, "900100");
    let parsed = parse_document(SHARED_LOG).unwrap();
    let entry = parsed.counters.get(&key).unwrap();
    let signals = evaluate_record(&key, entry, -1);

    assert_eq!(signals["is_shared"], Signal::Present(1.0));
    assert_eq!(signals["rank_imbalance_ratio"], Signal::Present(4.0));
    assert_eq!(signals["rank_time_imb"], Signal::Present(0.75));
    assert_eq!(signals["read_bw"], Signal::Present(0.25));
    assert_eq!(signals["read_iops"], Signal::Present(4.0));
}

#[test]
fn test_module_tier_sums_both_records() {
    let parsed = parse_document(SHARED_LOG).unwrap();
    let report = compute_signals(&parsed);

    let posix = &report.modules["POSIX"];
    let aggregates = posix.aggregates.as_ref().unwrap();
    assert_eq!(aggregates.total_bytes_read, 1048576.0 + 1198.0);
    assert_eq!(aggregates.total_reads, 18.0);
    // only the shared record reported a read time; the sum still rates
    assert_eq!(aggregates.total_read_time, 4.0);
    assert!(posix.signals["read_bw"].is_present());

    assert_eq!(report.job.total_bytes_read, 1048576.0 + 1198.0);
    assert_eq!(report.job.total_bytes_written, 0.0);
}

#[test]
fn test_module_sections_do_not_leak_counters() {
    let log = "\
# jobid: 11
# POSIX module data
POSIX\t0\tsame\tPOSIX_BYTES_READ\t100\t/a\t/\tx
# STDIO module data
STDIO\t0\tsame\tSTDIO_BYTES_WRITTEN\t200\t/a\t/\tx
";
    let parsed = parse_document(log).unwrap();
    let report = compute_signals(&parsed);

    let posix = &report.records[&RecordKey::new("POSIX", 0, "same")];
    let stdio = &report.records[&RecordKey::new("STDIO", 0, "same")];
    assert_eq!(posix["bytes_read"], Signal::Present(100.0));
    assert_eq!(posix["bytes_written"], Signal::Present(0.0));
    assert_eq!(stdio["bytes_written"], Signal::Present(200.0));
    assert_eq!(stdio["bytes_read"], Signal::Present(0.0));
}

proptest! {
    #[test]
    fn prop_entropy_norm_stays_in_unit_interval(
        bins in prop::collection::vec(0.0f64..1e9, 2..64)
    ) {
        let total: f64 = bins.iter().sum();
        let h = HeatmapProfile::entropy_norm(&bins, total);
        prop_assert!(h >= 0.0);
        prop_assert!(h <= 1.0 + 1e-9);
    }

    #[test]
    fn prop_entropy_concentrated_is_zero(value in 1.0f64..1e9, n in 2usize..64) {
        let mut bins = vec![0.0; n];
        bins[0] = value;
        let h = HeatmapProfile::entropy_norm(&bins, value);
        prop_assert!(h.abs() < 1e-9);
    }
}

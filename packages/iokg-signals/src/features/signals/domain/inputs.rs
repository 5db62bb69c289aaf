//! Evaluation inputs for one record
//!
//! `RecordInputs` packages everything a formula may consult: the
//! record's counters (behind accessors that keep the
//! unmonitored/missing distinction), the rank gating context, and for
//! HEATMAP records a pre-assembled histogram profile.

use crate::shared::models::{Fetched, RecordEntry};

use super::ModuleKind;

/// Tolerance below which a time span counts as zero
pub(crate) const EPS: f64 = 1e-9;

/// Per-direction operation families sharing one time-signal shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Read,
    Write,
    Meta,
}

impl Op {
    pub(crate) fn upper(self) -> &'static str {
        match self {
            Op::Read => "READ",
            Op::Write => "WRITE",
            Op::Meta => "META",
        }
    }

    pub(crate) const ALL: [Op; 3] = [Op::Read, Op::Write, Op::Meta];
}

/// Inputs to record-tier formula evaluation
pub struct RecordInputs<'a> {
    pub kind: ModuleKind,
    pub rank: i64,
    pub shared_rank: i64,
    entry: &'a RecordEntry,
    prefix: &'static str,
    pub heatmap: Option<HeatmapProfile>,
}

impl<'a> RecordInputs<'a> {
    pub fn new(kind: ModuleKind, rank: i64, shared_rank: i64, entry: &'a RecordEntry) -> Self {
        let heatmap = (kind == ModuleKind::Heatmap).then(|| HeatmapProfile::from_entry(entry));
        Self {
            kind,
            rank,
            shared_rank,
            entry,
            prefix: kind.counter_prefix().unwrap_or(""),
            heatmap,
        }
    }

    pub fn is_shared(&self) -> bool {
        self.rank == self.shared_rank
    }

    /// Fetch a counter by module-prefixed suffix, e.g. `BYTES_READ`
    /// becomes `POSIX_BYTES_READ` on a POSIX record.
    pub fn counter(&self, suffix: &str) -> Fetched {
        self.entry.fetch(&format!("{}_{}", self.prefix, suffix))
    }

    /// Counter value with missing/unmonitored collapsed to zero, for
    /// formulas whose NA classification lives in the denominator.
    pub fn num_or_zero(&self, suffix: &str) -> f64 {
        self.counter(suffix).value().unwrap_or(0.0)
    }

    pub fn sum_or_zero(&self, suffixes: &[&str]) -> f64 {
        suffixes.iter().map(|s| self.num_or_zero(s)).sum()
    }

    // Shorthand for the values nearly every formula touches

    pub fn bytes_read(&self) -> f64 {
        self.num_or_zero("BYTES_READ")
    }

    pub fn bytes_written(&self) -> f64 {
        self.num_or_zero("BYTES_WRITTEN")
    }

    pub fn reads(&self) -> f64 {
        self.num_or_zero("READS")
    }

    pub fn writes(&self) -> f64 {
        self.num_or_zero("WRITES")
    }

    pub fn read_time(&self) -> f64 {
        self.num_or_zero("F_READ_TIME")
    }

    pub fn write_time(&self) -> f64 {
        self.num_or_zero("F_WRITE_TIME")
    }

    pub fn meta_time(&self) -> f64 {
        self.num_or_zero("F_META_TIME")
    }

    pub(crate) fn op_start(&self, op: Op) -> Fetched {
        self.counter(&format!("F_{}_START_TIMESTAMP", op.upper()))
    }

    pub(crate) fn op_end(&self, op: Op) -> Fetched {
        self.counter(&format!("F_{}_END_TIMESTAMP", op.upper()))
    }

    pub(crate) fn op_time(&self, op: Op) -> Fetched {
        self.counter(&format!("F_{}_TIME", op.upper()))
    }

    /// Wall-clock span of one operation family, when both ends exist
    pub(crate) fn op_span(&self, op: Op) -> Option<f64> {
        let start = self.op_start(op).value()?;
        let end = self.op_end(op).value()?;
        Some((end - start).max(0.0))
    }

    /// Overall I/O window: earliest start to latest end over all ops
    pub(crate) fn io_span(&self) -> Option<f64> {
        let starts: Vec<f64> = Op::ALL.iter().filter_map(|op| self.op_start(*op).value()).collect();
        let ends: Vec<f64> = Op::ALL.iter().filter_map(|op| self.op_end(*op).value()).collect();
        if starts.is_empty() || ends.is_empty() {
            return None;
        }
        let min_start = starts.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_end = ends.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some((max_end - min_start).max(0.0))
    }

    /// Cumulative I/O time over the ops that reported one
    pub(crate) fn io_time(&self) -> Option<f64> {
        let times: Vec<f64> = Op::ALL.iter().filter_map(|op| self.op_time(*op).value()).collect();
        if times.is_empty() {
            None
        } else {
            Some(times.iter().sum())
        }
    }
}

/// Fixed-width time-bin histogram of read/write event counts
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapProfile {
    pub bin_width: f64,
    pub read_bins: Vec<f64>,
    pub write_bins: Vec<f64>,
}

impl HeatmapProfile {
    pub fn from_entry(entry: &RecordEntry) -> Self {
        let bin_width = entry
            .fetch("HEATMAP_F_BIN_WIDTH_SECONDS")
            .value()
            .unwrap_or(0.0);

        // Bin count is defined by the highest bin index present
        let mut max_bin: i64 = -1;
        for name in entry.counters.keys() {
            if let Some(idx) = bin_index(name) {
                max_bin = max_bin.max(idx);
            }
        }
        let n = (max_bin + 1).max(0) as usize;

        let mut read_bins = vec![0.0; n];
        let mut write_bins = vec![0.0; n];
        for (name, value) in &entry.counters {
            let Some(idx) = bin_index(name) else { continue };
            let idx = idx as usize;
            if idx >= n {
                continue;
            }
            let v = value.as_f64().unwrap_or(0.0);
            if name.starts_with("HEATMAP_READ_BIN_") {
                read_bins[idx] = v;
            } else {
                write_bins[idx] = v;
            }
        }

        Self {
            bin_width,
            read_bins,
            write_bins,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.read_bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bin_count() == 0
    }

    pub fn activity(&self, idx: usize) -> f64 {
        self.read_bins[idx] + self.write_bins[idx]
    }

    pub fn total_read(&self) -> f64 {
        self.read_bins.iter().sum()
    }

    pub fn total_write(&self) -> f64 {
        self.write_bins.iter().sum()
    }

    pub fn total_activity(&self) -> f64 {
        self.total_read() + self.total_write()
    }

    pub fn active_bins(&self) -> usize {
        (0..self.bin_count()).filter(|i| self.activity(*i) > 0.0).count()
    }

    /// Indices of the first and last bins with any activity
    pub fn active_range(&self) -> Option<(usize, usize)> {
        let first = (0..self.bin_count()).find(|i| self.activity(*i) > 0.0)?;
        let last = (0..self.bin_count()).rev().find(|i| self.activity(*i) > 0.0)?;
        Some((first, last))
    }

    /// Peak combined-activity bin: `(index, value)`, first index wins
    /// ties so reruns are stable
    pub fn peak(&self) -> Option<(usize, f64)> {
        (0..self.bin_count())
            .map(|i| (i, self.activity(i)))
            .fold(None, |best, (i, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((i, v)),
            })
    }

    /// Normalized Shannon entropy of one direction's distribution.
    /// Defined as 0 when the total is zero (no log of zero) and when
    /// there is a single bin (log(1) would divide by zero).
    pub fn entropy_norm(bins: &[f64], total: f64) -> f64 {
        if total <= 0.0 || bins.len() < 2 {
            return 0.0;
        }
        let mut h = 0.0;
        for &b in bins {
            if b > 0.0 {
                let p = b / total;
                h -= p * p.ln();
            }
        }
        h / (bins.len() as f64).ln()
    }
}

fn bin_index(counter: &str) -> Option<i64> {
    let rest = counter
        .strip_prefix("HEATMAP_READ_BIN_")
        .or_else(|| counter.strip_prefix("HEATMAP_WRITE_BIN_"))?;
    rest.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::CounterValue;

    fn heatmap_entry(read: &[(usize, f64)], write: &[(usize, f64)], width: f64) -> RecordEntry {
        let mut entry = RecordEntry::default();
        entry.counters.insert(
            "HEATMAP_F_BIN_WIDTH_SECONDS".to_string(),
            CounterValue::Float(width),
        );
        for (i, v) in read {
            entry
                .counters
                .insert(format!("HEATMAP_READ_BIN_{i}"), CounterValue::Float(*v));
        }
        for (i, v) in write {
            entry
                .counters
                .insert(format!("HEATMAP_WRITE_BIN_{i}"), CounterValue::Float(*v));
        }
        entry
    }

    #[test]
    fn test_profile_sizes_to_highest_bin() {
        let entry = heatmap_entry(&[(0, 1.0), (9, 2.0)], &[(3, 4.0)], 1.0);
        let profile = HeatmapProfile::from_entry(&entry);
        assert_eq!(profile.bin_count(), 10);
        assert_eq!(profile.read_bins[9], 2.0);
        assert_eq!(profile.write_bins[3], 4.0);
        assert_eq!(profile.read_bins[5], 0.0);
    }

    #[test]
    fn test_active_range_and_peak() {
        let entry = heatmap_entry(&[(2, 1.0), (5, 3.0)], &[(5, 1.0)], 2.0);
        let profile = HeatmapProfile::from_entry(&entry);
        assert_eq!(profile.active_range(), Some((2, 5)));
        assert_eq!(profile.peak(), Some((5, 4.0)));
        assert_eq!(profile.active_bins(), 2);
    }

    #[test]
    fn test_entropy_zero_total_is_zero() {
        assert_eq!(HeatmapProfile::entropy_norm(&[0.0, 0.0, 0.0], 0.0), 0.0);
    }

    #[test]
    fn test_entropy_uniform_is_one() {
        let bins = vec![2.0; 8];
        let h = HeatmapProfile::entropy_norm(&bins, 16.0);
        assert!((h - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_single_active_bin_is_zero() {
        let mut bins = vec![0.0; 10];
        bins[4] = 7.0;
        let h = HeatmapProfile::entropy_norm(&bins, 7.0);
        assert!(h.abs() < 1e-12);
    }
}

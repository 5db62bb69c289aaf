//! Record-tier evaluation

use crate::shared::models::{RecordEntry, RecordKey, SignalSet};

use super::super::domain::{ModuleKind, RecordInputs, RECORD_FORMULAS};

/// Evaluate every applicable formula for one record.
///
/// Modules outside the known families produce an empty set. A HEATMAP
/// record with no usable histogram (zero bin width or no bins at all)
/// reports only `heatmap_bin_width`, so a degenerate histogram never
/// fabricates zero-activity signals.
pub fn evaluate_record(key: &RecordKey, entry: &RecordEntry, shared_rank: i64) -> SignalSet {
    let kind = ModuleKind::classify(&key.module);
    let mut signals = SignalSet::new();
    if kind == ModuleKind::Other {
        return signals;
    }

    let inputs = RecordInputs::new(kind, key.rank, shared_rank, entry);

    let degenerate_heatmap = kind == ModuleKind::Heatmap
        && inputs
            .heatmap
            .as_ref()
            .map_or(true, |p| p.bin_width <= 0.0 || p.is_empty());

    for spec in RECORD_FORMULAS {
        if !spec.scope.applies_to(kind) {
            continue;
        }
        if degenerate_heatmap && spec.name != "heatmap_bin_width" {
            continue;
        }
        signals.insert(spec.name.to_string(), (spec.eval)(&inputs));
    }
    signals
}

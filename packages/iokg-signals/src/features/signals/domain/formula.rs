//! The record-tier formula table
//!
//! Modeled as declarative data: each entry names a signal, the tier it
//! belongs to, the module family it applies to, and a pure evaluation
//! function. Keeping the set enumerable lets tests walk every formula
//! and check its NA classification instead of chasing branches.

use crate::shared::models::{Fetched, NaReason, Signal};

use super::inputs::{Op, RecordInputs, EPS};
use super::{ModuleKind, Tier};

/// Which module family a formula applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaScope {
    /// POSIX, STDIO, and MPI-IO records
    ByteStream,
    /// POSIX records only
    PosixOnly,
    /// Shared-file rank-time family: POSIX and STDIO records
    SharedRankTime,
    /// HEATMAP records only
    Heatmap,
}

impl FormulaScope {
    pub fn applies_to(&self, kind: ModuleKind) -> bool {
        match self {
            FormulaScope::ByteStream => kind.is_byte_stream(),
            FormulaScope::PosixOnly => kind == ModuleKind::Posix,
            FormulaScope::SharedRankTime => {
                matches!(kind, ModuleKind::Posix | ModuleKind::Stdio)
            }
            FormulaScope::Heatmap => kind == ModuleKind::Heatmap,
        }
    }
}

/// One formula in the table
pub struct FormulaSpec {
    pub name: &'static str,
    pub tier: Tier,
    pub scope: FormulaScope,
    pub eval: fn(&RecordInputs) -> Signal,
}

// ─── helpers ───────────────────────────────────────────────────────

fn ts_signal(f: Fetched) -> Signal {
    match f.value() {
        Some(v) => Signal::Present(v),
        None => Signal::Unavailable(NaReason::MissingTimestamp),
    }
}

fn time_signal(f: Fetched) -> Signal {
    match f.value() {
        Some(v) => Signal::Present(v),
        None => Signal::Unavailable(NaReason::MissingTimeCounter),
    }
}

fn passthrough(f: Fetched) -> Signal {
    match f {
        Fetched::Value(v) => Signal::Present(v),
        Fetched::Unmonitored => Signal::Unavailable(NaReason::NotMonitored),
        Fetched::Missing => Signal::Unavailable(NaReason::NotAvailable),
    }
}

fn span_signal(i: &RecordInputs, op: Op) -> Signal {
    match i.op_span(op) {
        Some(v) => Signal::Present(v),
        None => Signal::Unavailable(NaReason::MissingTimestamp),
    }
}

fn busy_signal(i: &RecordInputs, op: Op) -> Signal {
    match (i.op_time(op).value(), i.op_span(op)) {
        (Some(t), Some(s)) if s > EPS => Signal::Present(t / s),
        (Some(_), Some(_)) => Signal::Unavailable(NaReason::ZeroSpan),
        _ => Signal::Unavailable(NaReason::DependencyMissing),
    }
}

fn rate(num: f64, time: f64, reason: NaReason) -> Signal {
    if time > 0.0 {
        Signal::Present(num / time)
    } else {
        Signal::Unavailable(reason)
    }
}

const MIB: f64 = 1024.0 * 1024.0;

/// Rank gate for the imbalance family: shared access with bytes moved
fn shared_bytes_gate(i: &RecordInputs) -> Option<NaReason> {
    if !i.is_shared() {
        Some(NaReason::NotSharedFile)
    } else if i.bytes_read() + i.bytes_written() <= 0.0 {
        Some(NaReason::NoBytes)
    } else {
        None
    }
}

// ─── byte-stream formulas ──────────────────────────────────────────

fn bytes_read(i: &RecordInputs) -> Signal {
    Signal::Present(i.bytes_read())
}

fn bytes_written(i: &RecordInputs) -> Signal {
    Signal::Present(i.bytes_written())
}

fn reads(i: &RecordInputs) -> Signal {
    Signal::Present(i.reads())
}

fn writes(i: &RecordInputs) -> Signal {
    Signal::Present(i.writes())
}

fn read_start_ts(i: &RecordInputs) -> Signal {
    ts_signal(i.op_start(Op::Read))
}

fn read_end_ts(i: &RecordInputs) -> Signal {
    ts_signal(i.op_end(Op::Read))
}

fn read_time(i: &RecordInputs) -> Signal {
    time_signal(i.op_time(Op::Read))
}

fn read_span(i: &RecordInputs) -> Signal {
    span_signal(i, Op::Read)
}

fn read_busy_frac(i: &RecordInputs) -> Signal {
    busy_signal(i, Op::Read)
}

fn write_start_ts(i: &RecordInputs) -> Signal {
    ts_signal(i.op_start(Op::Write))
}

fn write_end_ts(i: &RecordInputs) -> Signal {
    ts_signal(i.op_end(Op::Write))
}

fn write_time(i: &RecordInputs) -> Signal {
    time_signal(i.op_time(Op::Write))
}

fn write_span(i: &RecordInputs) -> Signal {
    span_signal(i, Op::Write)
}

fn write_busy_frac(i: &RecordInputs) -> Signal {
    busy_signal(i, Op::Write)
}

fn meta_start_ts(i: &RecordInputs) -> Signal {
    ts_signal(i.op_start(Op::Meta))
}

fn meta_end_ts(i: &RecordInputs) -> Signal {
    ts_signal(i.op_end(Op::Meta))
}

fn meta_time_sig(i: &RecordInputs) -> Signal {
    time_signal(i.op_time(Op::Meta))
}

fn meta_span(i: &RecordInputs) -> Signal {
    span_signal(i, Op::Meta)
}

fn meta_busy_frac(i: &RecordInputs) -> Signal {
    busy_signal(i, Op::Meta)
}

fn io_span(i: &RecordInputs) -> Signal {
    match i.io_span() {
        Some(v) => Signal::Present(v),
        None => Signal::Unavailable(NaReason::MissingTimestamp),
    }
}

fn io_time(i: &RecordInputs) -> Signal {
    match i.io_time() {
        Some(v) => Signal::Present(v),
        None => Signal::Unavailable(NaReason::MissingTimeCounter),
    }
}

fn busy_frac(i: &RecordInputs) -> Signal {
    match (i.io_time(), i.io_span()) {
        (Some(t), Some(s)) if s > EPS => Signal::Present(t / s),
        _ => Signal::Unavailable(NaReason::DependencyMissing),
    }
}

fn read_bw(i: &RecordInputs) -> Signal {
    rate(i.bytes_read() / MIB, i.read_time(), NaReason::NoReadTime)
}

fn write_bw(i: &RecordInputs) -> Signal {
    rate(i.bytes_written() / MIB, i.write_time(), NaReason::NoWriteTime)
}

fn read_iops(i: &RecordInputs) -> Signal {
    rate(i.reads(), i.read_time(), NaReason::NoReadTime)
}

fn write_iops(i: &RecordInputs) -> Signal {
    rate(i.writes(), i.write_time(), NaReason::NoWriteTime)
}

fn avg_read_size(i: &RecordInputs) -> Signal {
    Signal::div(i.bytes_read(), i.reads(), NaReason::NoReads)
}

fn avg_write_size(i: &RecordInputs) -> Signal {
    Signal::div(i.bytes_written(), i.writes(), NaReason::NoWrites)
}

// ─── POSIX-only formulas ───────────────────────────────────────────

fn seq_read_ratio(i: &RecordInputs) -> Signal {
    Signal::div(i.num_or_zero("SEQ_READS"), i.reads(), NaReason::NoReads)
}

fn seq_write_ratio(i: &RecordInputs) -> Signal {
    Signal::div(i.num_or_zero("SEQ_WRITES"), i.writes(), NaReason::NoWrites)
}

fn consec_read_ratio(i: &RecordInputs) -> Signal {
    Signal::div(i.num_or_zero("CONSEC_READS"), i.reads(), NaReason::NoReads)
}

fn consec_write_ratio(i: &RecordInputs) -> Signal {
    Signal::div(i.num_or_zero("CONSEC_WRITES"), i.writes(), NaReason::NoWrites)
}

fn seq_ratio(i: &RecordInputs) -> Signal {
    Signal::div(
        i.num_or_zero("SEQ_READS") + i.num_or_zero("SEQ_WRITES"),
        i.reads() + i.writes(),
        NaReason::NoIo,
    )
}

fn consec_ratio(i: &RecordInputs) -> Signal {
    Signal::div(
        i.num_or_zero("CONSEC_READS") + i.num_or_zero("CONSEC_WRITES"),
        i.reads() + i.writes(),
        NaReason::NoIo,
    )
}

const META_OPS: &[&str] = &["OPENS", "STATS", "SEEKS", "FSYNCS", "FDSYNCS"];

fn meta_ops(i: &RecordInputs) -> Signal {
    Signal::Present(i.sum_or_zero(META_OPS))
}

fn meta_intensity(i: &RecordInputs) -> Signal {
    Signal::div(i.sum_or_zero(META_OPS), i.reads() + i.writes(), NaReason::NoIo)
}

fn meta_fraction(i: &RecordInputs) -> Signal {
    let meta = i.meta_time();
    Signal::div(meta, meta + i.read_time() + i.write_time(), NaReason::NoTime)
}

fn unaligned_read_ratio(i: &RecordInputs) -> Signal {
    Signal::div(i.num_or_zero("FILE_NOT_ALIGNED"), i.reads(), NaReason::NoReads)
}

fn unaligned_write_ratio(i: &RecordInputs) -> Signal {
    Signal::div(i.num_or_zero("FILE_NOT_ALIGNED"), i.writes(), NaReason::NoWrites)
}

const SMALL_READ: &[&str] = &["SIZE_READ_0_100", "SIZE_READ_100_1K", "SIZE_READ_1K_10K"];
const SMALL_WRITE: &[&str] = &["SIZE_WRITE_0_100", "SIZE_WRITE_100_1K", "SIZE_WRITE_1K_10K"];

fn small_read_ratio(i: &RecordInputs) -> Signal {
    Signal::div(i.sum_or_zero(SMALL_READ), i.reads(), NaReason::NoReads)
}

fn small_write_ratio(i: &RecordInputs) -> Signal {
    Signal::div(i.sum_or_zero(SMALL_WRITE), i.writes(), NaReason::NoWrites)
}

fn reuse_proxy(i: &RecordInputs) -> Signal {
    // Highest read offset + 1 approximates the file size
    let estimated = i.num_or_zero("MAX_BYTE_READ") + 1.0;
    if estimated > 1.0 {
        Signal::Present(i.bytes_read() / estimated)
    } else {
        Signal::Unavailable(NaReason::NoFileSize)
    }
}

fn rank_imbalance_ratio(i: &RecordInputs) -> Signal {
    match shared_bytes_gate(i) {
        Some(reason) => Signal::Unavailable(reason),
        None => Signal::div(
            i.num_or_zero("SLOWEST_RANK_BYTES"),
            i.num_or_zero("FASTEST_RANK_BYTES"),
            NaReason::NoFastestBytes,
        ),
    }
}

fn bw_variance_proxy(i: &RecordInputs) -> Signal {
    match shared_bytes_gate(i) {
        Some(reason) => Signal::Unavailable(reason),
        None => Signal::Present(i.num_or_zero("F_VARIANCE_RANK_BYTES")),
    }
}

fn is_shared(i: &RecordInputs) -> Signal {
    Signal::Present(if i.is_shared() { 1.0 } else { 0.0 })
}

fn avg_read_lat(i: &RecordInputs) -> Signal {
    let (ops, time) = (i.reads(), i.read_time());
    if ops > 0.0 && time > 0.0 {
        Signal::Present(time / ops)
    } else if ops == 0.0 {
        Signal::Unavailable(NaReason::NoReads)
    } else {
        Signal::Unavailable(NaReason::NoReadTime)
    }
}

fn avg_write_lat(i: &RecordInputs) -> Signal {
    let (ops, time) = (i.writes(), i.write_time());
    if ops > 0.0 && time > 0.0 {
        Signal::Present(time / ops)
    } else if ops == 0.0 {
        Signal::Unavailable(NaReason::NoWrites)
    } else {
        Signal::Unavailable(NaReason::NoWriteTime)
    }
}

fn max_read_time(i: &RecordInputs) -> Signal {
    passthrough(i.counter("F_MAX_READ_TIME"))
}

fn max_write_time(i: &RecordInputs) -> Signal {
    passthrough(i.counter("F_MAX_WRITE_TIME"))
}

fn max_read_time_size(i: &RecordInputs) -> Signal {
    passthrough(i.counter("MAX_READ_TIME_SIZE"))
}

fn max_write_time_size(i: &RecordInputs) -> Signal {
    passthrough(i.counter("MAX_WRITE_TIME_SIZE"))
}

fn tail_read_ratio(i: &RecordInputs) -> Signal {
    match (i.counter("F_MAX_READ_TIME").value(), avg_read_lat(i).value()) {
        (Some(max), Some(avg)) if avg > EPS => Signal::Present(max / avg),
        _ => Signal::Unavailable(NaReason::DependencyMissing),
    }
}

fn tail_write_ratio(i: &RecordInputs) -> Signal {
    match (i.counter("F_MAX_WRITE_TIME").value(), avg_write_lat(i).value()) {
        (Some(max), Some(avg)) if avg > EPS => Signal::Present(max / avg),
        _ => Signal::Unavailable(NaReason::DependencyMissing),
    }
}

fn rw_switches(i: &RecordInputs) -> Signal {
    passthrough(i.counter("RW_SWITCHES"))
}

fn rw_switch_rate(i: &RecordInputs) -> Signal {
    match (i.counter("RW_SWITCHES").value(), i.io_span()) {
        (Some(switches), Some(span)) if span > EPS => Signal::Present(switches / span),
        _ => Signal::Unavailable(NaReason::DependencyMissing),
    }
}

// ─── shared-file rank-time formulas (POSIX and STDIO) ──────────────

fn fastest_rank_time(i: &RecordInputs) -> Signal {
    if i.is_shared() {
        passthrough(i.counter("F_FASTEST_RANK_TIME"))
    } else {
        Signal::Unavailable(NaReason::NotSharedFile)
    }
}

fn slowest_rank_time(i: &RecordInputs) -> Signal {
    if i.is_shared() {
        passthrough(i.counter("F_SLOWEST_RANK_TIME"))
    } else {
        Signal::Unavailable(NaReason::NotSharedFile)
    }
}

fn var_rank_time(i: &RecordInputs) -> Signal {
    if i.is_shared() {
        passthrough(i.counter("F_VARIANCE_RANK_TIME"))
    } else {
        Signal::Unavailable(NaReason::NotSharedFile)
    }
}

fn rank_time_imb(i: &RecordInputs) -> Signal {
    if !i.is_shared() {
        return Signal::Unavailable(NaReason::NotSharedFile);
    }
    match (
        i.counter("F_FASTEST_RANK_TIME").value(),
        i.counter("F_SLOWEST_RANK_TIME").value(),
    ) {
        (Some(fastest), Some(slowest)) if slowest > EPS => {
            Signal::Present((slowest - fastest) / slowest)
        }
        _ => Signal::Unavailable(NaReason::DependencyMissing),
    }
}

// ─── HEATMAP formulas ──────────────────────────────────────────────

fn with_profile(i: &RecordInputs, f: fn(&super::HeatmapProfile) -> Signal) -> Signal {
    match &i.heatmap {
        Some(profile) => f(profile),
        None => Signal::Unavailable(NaReason::NotAvailable),
    }
}

fn heatmap_bin_width(i: &RecordInputs) -> Signal {
    with_profile(i, |p| {
        if p.bin_width > 0.0 {
            Signal::Present(p.bin_width)
        } else {
            Signal::Unavailable(NaReason::NoBinWidth)
        }
    })
}

fn total_read_events(i: &RecordInputs) -> Signal {
    with_profile(i, |p| Signal::Present(p.total_read()))
}

fn total_write_events(i: &RecordInputs) -> Signal {
    with_profile(i, |p| Signal::Present(p.total_write()))
}

fn active_bins(i: &RecordInputs) -> Signal {
    with_profile(i, |p| Signal::Present(p.active_bins() as f64))
}

fn active_time(i: &RecordInputs) -> Signal {
    with_profile(i, |p| Signal::Present(p.active_bins() as f64 * p.bin_width))
}

fn activity_span(i: &RecordInputs) -> Signal {
    with_profile(i, |p| match p.active_range() {
        Some((first, last)) => Signal::Present((last - first + 1) as f64 * p.bin_width),
        None => Signal::Present(0.0),
    })
}

fn peak_activity_bin(i: &RecordInputs) -> Signal {
    with_profile(i, |p| match p.peak() {
        Some((idx, _)) => Signal::Present(idx as f64),
        None => Signal::Unavailable(NaReason::NoActivity),
    })
}

fn peak_activity_value(i: &RecordInputs) -> Signal {
    with_profile(i, |p| Signal::Present(p.peak().map(|(_, v)| v).unwrap_or(0.0)))
}

fn read_activity_entropy_norm(i: &RecordInputs) -> Signal {
    with_profile(i, |p| {
        Signal::Present(super::HeatmapProfile::entropy_norm(&p.read_bins, p.total_read()))
    })
}

fn write_activity_entropy_norm(i: &RecordInputs) -> Signal {
    with_profile(i, |p| {
        Signal::Present(super::HeatmapProfile::entropy_norm(&p.write_bins, p.total_write()))
    })
}

fn top1_share(i: &RecordInputs) -> Signal {
    with_profile(i, |p| {
        let total = p.total_activity();
        match p.peak() {
            Some((_, peak)) if total > 0.0 => Signal::Present(peak / total),
            _ => Signal::Unavailable(NaReason::NoActivity),
        }
    })
}

// ─── the table ─────────────────────────────────────────────────────

macro_rules! record_formula {
    ($name:literal, $scope:ident, $eval:path) => {
        FormulaSpec {
            name: $name,
            tier: Tier::Record,
            scope: FormulaScope::$scope,
            eval: $eval,
        }
    };
}

/// Every record-tier signal, in evaluation-independent order
pub static RECORD_FORMULAS: &[FormulaSpec] = &[
    // raw passthrough
    record_formula!("bytes_read", ByteStream, bytes_read),
    record_formula!("bytes_written", ByteStream, bytes_written),
    record_formula!("reads", ByteStream, reads),
    record_formula!("writes", ByteStream, writes),
    // time family
    record_formula!("read_start_ts", ByteStream, read_start_ts),
    record_formula!("read_end_ts", ByteStream, read_end_ts),
    record_formula!("read_time", ByteStream, read_time),
    record_formula!("read_span", ByteStream, read_span),
    record_formula!("read_busy_frac", ByteStream, read_busy_frac),
    record_formula!("write_start_ts", ByteStream, write_start_ts),
    record_formula!("write_end_ts", ByteStream, write_end_ts),
    record_formula!("write_time", ByteStream, write_time),
    record_formula!("write_span", ByteStream, write_span),
    record_formula!("write_busy_frac", ByteStream, write_busy_frac),
    record_formula!("meta_start_ts", ByteStream, meta_start_ts),
    record_formula!("meta_end_ts", ByteStream, meta_end_ts),
    record_formula!("meta_time", ByteStream, meta_time_sig),
    record_formula!("meta_span", ByteStream, meta_span),
    record_formula!("meta_busy_frac", ByteStream, meta_busy_frac),
    record_formula!("io_span", ByteStream, io_span),
    record_formula!("io_time", ByteStream, io_time),
    record_formula!("busy_frac", ByteStream, busy_frac),
    // performance family
    record_formula!("read_bw", ByteStream, read_bw),
    record_formula!("write_bw", ByteStream, write_bw),
    record_formula!("read_iops", ByteStream, read_iops),
    record_formula!("write_iops", ByteStream, write_iops),
    record_formula!("avg_read_size", ByteStream, avg_read_size),
    record_formula!("avg_write_size", ByteStream, avg_write_size),
    // access patterns
    record_formula!("seq_read_ratio", PosixOnly, seq_read_ratio),
    record_formula!("seq_write_ratio", PosixOnly, seq_write_ratio),
    record_formula!("consec_read_ratio", PosixOnly, consec_read_ratio),
    record_formula!("consec_write_ratio", PosixOnly, consec_write_ratio),
    record_formula!("seq_ratio", PosixOnly, seq_ratio),
    record_formula!("consec_ratio", PosixOnly, consec_ratio),
    // metadata
    record_formula!("meta_ops", PosixOnly, meta_ops),
    record_formula!("meta_intensity", PosixOnly, meta_intensity),
    record_formula!("meta_fraction", PosixOnly, meta_fraction),
    // alignment
    record_formula!("unaligned_read_ratio", PosixOnly, unaligned_read_ratio),
    record_formula!("unaligned_write_ratio", PosixOnly, unaligned_write_ratio),
    // small I/O
    record_formula!("small_read_ratio", PosixOnly, small_read_ratio),
    record_formula!("small_write_ratio", PosixOnly, small_write_ratio),
    // data reuse
    record_formula!("reuse_proxy", PosixOnly, reuse_proxy),
    // rank imbalance (byte side)
    record_formula!("rank_imbalance_ratio", PosixOnly, rank_imbalance_ratio),
    record_formula!("bw_variance_proxy", PosixOnly, bw_variance_proxy),
    record_formula!("is_shared", PosixOnly, is_shared),
    // latency / tail
    record_formula!("avg_read_lat", PosixOnly, avg_read_lat),
    record_formula!("avg_write_lat", PosixOnly, avg_write_lat),
    record_formula!("max_read_time", PosixOnly, max_read_time),
    record_formula!("max_write_time", PosixOnly, max_write_time),
    record_formula!("max_read_time_size", PosixOnly, max_read_time_size),
    record_formula!("max_write_time_size", PosixOnly, max_write_time_size),
    record_formula!("tail_read_ratio", PosixOnly, tail_read_ratio),
    record_formula!("tail_write_ratio", PosixOnly, tail_write_ratio),
    record_formula!("rw_switches", PosixOnly, rw_switches),
    record_formula!("rw_switch_rate", PosixOnly, rw_switch_rate),
    // shared-file rank-time family
    record_formula!("fastest_rank_time", SharedRankTime, fastest_rank_time),
    record_formula!("slowest_rank_time", SharedRankTime, slowest_rank_time),
    record_formula!("var_rank_time", SharedRankTime, var_rank_time),
    record_formula!("rank_time_imb", SharedRankTime, rank_time_imb),
    // heatmap
    record_formula!("heatmap_bin_width", Heatmap, heatmap_bin_width),
    record_formula!("total_read_events", Heatmap, total_read_events),
    record_formula!("total_write_events", Heatmap, total_write_events),
    record_formula!("active_bins", Heatmap, active_bins),
    record_formula!("active_time", Heatmap, active_time),
    record_formula!("activity_span", Heatmap, activity_span),
    record_formula!("peak_activity_bin", Heatmap, peak_activity_bin),
    record_formula!("peak_activity_value", Heatmap, peak_activity_value),
    record_formula!("read_activity_entropy_norm", Heatmap, read_activity_entropy_norm),
    record_formula!("write_activity_entropy_norm", Heatmap, write_activity_entropy_norm),
    record_formula!("top1_share", Heatmap, top1_share),
];

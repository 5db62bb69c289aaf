//! Counter table models
//!
//! The counter table is keyed by the full `(module, rank, record_id)`
//! triple. Keying by `(module, record_id)` alone collapses per-rank
//! records, and keying by `record_id` alone leaks counters across
//! module sections; both are defect classes this model rules out.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::Serialize;

use super::UNKNOWN;

/// Raw counter value as read from the log
///
/// The "not monitored" sentinel is retained as a distinguished state
/// rather than the number it was written as, so formula evaluation can
/// classify it instead of dividing by -1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CounterValue {
    Int(i64),
    Float(f64),
    Unmonitored,
}

impl CounterValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CounterValue::Int(v) => Some(*v as f64),
            CounterValue::Float(v) => Some(*v),
            CounterValue::Unmonitored => None,
        }
    }
}

/// Result of looking up a counter on a record
///
/// `Unmonitored` (the sentinel was written) and `Missing` (the counter
/// never appeared) map to different NA reasons downstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fetched {
    Value(f64),
    Unmonitored,
    Missing,
}

impl Fetched {
    pub fn value(self) -> Option<f64> {
        match self {
            Fetched::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Identity of one observation unit: one file access context under one
/// module for one rank
///
/// `Ord` gives the table a stable iteration order (module, then rank,
/// then record id), which downstream emission relies on for
/// byte-identical reruns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RecordKey {
    pub module: String,
    pub rank: i64,
    pub record_id: String,
}

impl RecordKey {
    pub fn new(module: impl Into<String>, rank: i64, record_id: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            rank,
            record_id: record_id.into(),
        }
    }
}

/// Sidecar metadata attached to a record declaration (not a counter)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordMeta {
    pub file_name: String,
    pub mount_pt: String,
    pub fs_type: String,
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self {
            file_name: UNKNOWN.to_string(),
            mount_pt: UNKNOWN.to_string(),
            fs_type: UNKNOWN.to_string(),
        }
    }
}

/// All counters and sidecar metadata for one record key
#[derive(Debug, Clone, Default)]
pub struct RecordEntry {
    pub counters: AHashMap<String, CounterValue>,
    pub meta: RecordMeta,
}

impl RecordEntry {
    pub fn fetch(&self, counter: &str) -> Fetched {
        match self.counters.get(counter) {
            Some(CounterValue::Unmonitored) => Fetched::Unmonitored,
            Some(v) => match v.as_f64() {
                Some(f) => Fetched::Value(f),
                None => Fetched::Missing,
            },
            None => Fetched::Missing,
        }
    }
}

/// In-memory counter table for one document
#[derive(Debug, Clone, Default)]
pub struct CounterTable {
    entries: BTreeMap<RecordKey, RecordEntry>,
}

impl CounterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or create the bucket for a record key. A key seen under a
    /// new module section always lands in a brand-new bucket because
    /// the module is part of the key.
    pub fn entry_mut(&mut self, key: RecordKey) -> &mut RecordEntry {
        self.entries.entry(key).or_default()
    }

    pub fn get(&self, key: &RecordKey) -> Option<&RecordEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordKey, &RecordEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

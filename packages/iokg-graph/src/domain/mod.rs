//! Graph domain model
//!
//! Entities are identified by their name string; names double as the
//! natural keys downstream loaders join on, so the naming scheme is
//! part of the output contract and must stay stable across runs.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use iokg_signals::{Signal, SignalSet};

use crate::error::Result;

/// Entity type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Application,
    Job,
    Module,
    Record,
    File,
    FileSystem,
}

/// Relationship type tag; serialized through its keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Runs,
    HasModule,
    HasRecord,
    Accesses,
    ResidesOn,
    Touches,
}

impl RelationKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            RelationKind::Runs => "runs",
            RelationKind::HasModule => "has_module",
            RelationKind::HasRecord => "has_record",
            RelationKind::Accesses => "accesses",
            RelationKind::ResidesOn => "resides_on",
            RelationKind::Touches => "touches",
        }
    }
}

/// Flat, ordered attribute map
pub type Attrs = BTreeMap<String, Value>;

#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    #[serde(rename = "entity_name")]
    pub name: String,
    #[serde(rename = "entity_type")]
    pub kind: EntityKind,
    #[serde(flatten)]
    pub attrs: Attrs,
}

#[derive(Debug, Clone, Serialize)]
pub struct Relationship {
    pub src_id: String,
    pub tgt_id: String,
    pub keywords: RelationKind,
    pub weight: f64,
}

/// The assembled per-document graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphArtifact {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

impl GraphArtifact {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Render a numeric value as JSON, keeping integral values as integers
/// so reruns print identically.
pub fn number(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < 9_007_199_254_740_992.0 {
        Value::from(v as i64)
    } else {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Attach a signal set to an attribute map. An unavailable signal
/// becomes `null` plus a sibling `<name>_na_reason` string; it is never
/// dropped and never rendered as zero.
pub fn attach_signals(attrs: &mut Attrs, signals: &SignalSet) {
    for (name, signal) in signals {
        match signal {
            Signal::Present(v) => {
                attrs.insert(name.clone(), number(*v));
            }
            Signal::Unavailable(reason) => {
                attrs.insert(name.clone(), Value::Null);
                attrs.insert(
                    format!("{name}_na_reason"),
                    Value::String(reason.as_str().to_string()),
                );
            }
        }
    }
}

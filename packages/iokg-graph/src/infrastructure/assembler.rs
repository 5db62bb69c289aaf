//! Entity/relationship assembly
//!
//! One complete pass per document. Entity registration is idempotent
//! by name; attribute maps are attached at creation and never mutated
//! afterwards. FileSystem entities and Job→FileSystem edges come only
//! from the "touched filesystems" set gathered off record metadata:
//! the mount table describes configuration, the records describe
//! behavior, and only behavior earns an edge.

use std::collections::BTreeSet;

use ahash::AHashMap;
use serde_json::Value;
use tracing::debug;

use iokg_signals::{ParsedLog, SignalReport, UNKNOWN};

use crate::domain::{
    attach_signals, number, Attrs, Entity, EntityKind, GraphArtifact, RelationKind, Relationship,
};

#[derive(Debug, Default)]
pub struct GraphAssembler {
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
    index: AHashMap<String, usize>,
}

impl GraphAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity, returning true when it was newly created.
    /// A re-registration under the same name keeps the original
    /// attributes untouched.
    fn register(&mut self, name: String, kind: EntityKind, attrs: Attrs) -> bool {
        if self.index.contains_key(&name) {
            return false;
        }
        self.index.insert(name.clone(), self.entities.len());
        self.entities.push(Entity { name, kind, attrs });
        true
    }

    fn relate(&mut self, src: &str, tgt: &str, kind: RelationKind) {
        self.relationships.push(Relationship {
            src_id: src.to_string(),
            tgt_id: tgt.to_string(),
            keywords: kind,
            weight: 1.0,
        });
    }

    /// Build the full entity/relationship collection for one document
    pub fn assemble(mut self, parsed: &ParsedLog, report: &SignalReport) -> GraphArtifact {
        let job_id = parsed.job.job_id.as_deref().unwrap_or(UNKNOWN);
        let job_name = format!("Job_{job_id}");

        self.register(job_name.clone(), EntityKind::Job, job_attrs(parsed, report));

        // Application exists only when the header named an executable
        if let Some(exe) = &parsed.job.exe {
            let app_name = format!("App_{exe}");
            let mut attrs = Attrs::new();
            attrs.insert("exe".to_string(), Value::from(exe.clone()));
            self.register(app_name.clone(), EntityKind::Application, attrs);
            self.relate(&app_name, &job_name, RelationKind::Runs);
        }

        let mut touched: BTreeSet<(String, String)> = BTreeSet::new();

        for (key, signals) in &report.records {
            let module_name = format!("Module_{job_id}_{}", key.module);
            if self.register(
                module_name.clone(),
                EntityKind::Module,
                module_attrs(&key.module, report),
            ) {
                self.relate(&job_name, &module_name, RelationKind::HasModule);
            }

            let record_name = format!(
                "Record_{job_id}_{}_{}_rank{}",
                key.module, key.record_id, key.rank
            );
            let meta = parsed
                .counters
                .get(key)
                .map(|entry| entry.meta.clone())
                .unwrap_or_default();

            let mut attrs = Attrs::new();
            attrs.insert("module".to_string(), Value::from(key.module.clone()));
            attrs.insert("rank".to_string(), number(key.rank as f64));
            attrs.insert("record_id".to_string(), Value::from(key.record_id.clone()));
            attrs.insert("file_name".to_string(), Value::from(meta.file_name.clone()));
            attrs.insert("mount_pt".to_string(), Value::from(meta.mount_pt.clone()));
            attrs.insert("fs_type".to_string(), Value::from(meta.fs_type.clone()));
            attach_signals(&mut attrs, signals);
            self.register(record_name.clone(), EntityKind::Record, attrs);
            self.relate(&module_name, &record_name, RelationKind::HasRecord);

            let fs_known = meta.fs_type != UNKNOWN && meta.mount_pt != UNKNOWN;
            if fs_known {
                touched.insert((meta.fs_type.clone(), meta.mount_pt.clone()));
            }

            if !is_synthetic_path(&meta.file_name) {
                let file_name = format!("File_{}", meta.file_name);
                if self.register(file_name.clone(), EntityKind::File, file_attrs(&meta)) && fs_known
                {
                    let fs = filesystem_name(&meta.fs_type, &meta.mount_pt);
                    self.relate(&file_name, &fs, RelationKind::ResidesOn);
                }
                self.relate(&record_name, &file_name, RelationKind::Accesses);
            }
        }

        // Only filesystems a record actually touched become entities;
        // merely-configured mounts stay a Job attribute.
        for (fs_type, mount_pt) in &touched {
            let fs_name = filesystem_name(fs_type, mount_pt);
            let mut attrs = Attrs::new();
            attrs.insert("fs_type".to_string(), Value::from(fs_type.clone()));
            attrs.insert("mount_pt".to_string(), Value::from(mount_pt.clone()));
            self.register(fs_name.clone(), EntityKind::FileSystem, attrs);
            self.relate(&job_name, &fs_name, RelationKind::Touches);
        }

        debug!(
            entities = self.entities.len(),
            relationships = self.relationships.len(),
            job = job_id,
            "assembled document graph"
        );

        GraphArtifact {
            entities: self.entities,
            relationships: self.relationships,
        }
    }
}

fn filesystem_name(fs_type: &str, mount_pt: &str) -> String {
    format!("FS_{}_{}", fs_type, mount_pt.replace('/', "_"))
}

/// Heatmap pseudo-files and unknown sidecars never become File
/// entities; anything that is not an absolute path is synthetic.
fn is_synthetic_path(path: &str) -> bool {
    path == UNKNOWN || path.is_empty() || !path.starts_with('/')
}

fn job_attrs(parsed: &ParsedLog, report: &SignalReport) -> Attrs {
    let mut attrs = Attrs::new();
    let job = &parsed.job;

    if let Some(v) = &job.job_id {
        attrs.insert("job_id".to_string(), Value::from(v.clone()));
    }
    if let Some(v) = job.uid {
        attrs.insert("uid".to_string(), number(v as f64));
    }
    if let Some(v) = job.nprocs {
        attrs.insert("nprocs".to_string(), number(v as f64));
    }
    if let Some(v) = job.runtime {
        attrs.insert("runtime".to_string(), number(v));
    }
    if let Some(v) = job.start_time {
        attrs.insert("start_time".to_string(), number(v as f64));
    }
    if let Some(v) = job.end_time {
        attrs.insert("end_time".to_string(), number(v as f64));
    }
    if let Some(v) = &job.log_version {
        attrs.insert("log_version".to_string(), Value::from(v.clone()));
    }

    let mounts: serde_json::Map<String, Value> = parsed
        .mounts
        .iter()
        .map(|(mount, fs)| (mount.clone(), Value::from(fs.clone())))
        .collect();
    attrs.insert("mount_table".to_string(), Value::Object(mounts));

    attrs.insert("total_bytes_read".to_string(), number(report.job.total_bytes_read));
    attrs.insert(
        "total_bytes_written".to_string(),
        number(report.job.total_bytes_written),
    );
    attrs.insert("total_reads".to_string(), number(report.job.total_reads));
    attrs.insert("total_writes".to_string(), number(report.job.total_writes));

    attrs
}

fn module_attrs(module: &str, report: &SignalReport) -> Attrs {
    let mut attrs = Attrs::new();
    attrs.insert("module".to_string(), Value::from(module.to_string()));

    if let Some(module_report) = report.modules.get(module) {
        if let Some(agg) = &module_report.aggregates {
            attrs.insert("total_bytes_read".to_string(), number(agg.total_bytes_read));
            attrs.insert(
                "total_bytes_written".to_string(),
                number(agg.total_bytes_written),
            );
            attrs.insert("total_reads".to_string(), number(agg.total_reads));
            attrs.insert("total_writes".to_string(), number(agg.total_writes));
            attrs.insert("total_read_time".to_string(), number(agg.total_read_time));
            attrs.insert("total_write_time".to_string(), number(agg.total_write_time));
        }
        attach_signals(&mut attrs, &module_report.signals);
    }

    attrs
}

fn file_attrs(meta: &iokg_signals::RecordMeta) -> Attrs {
    let mut attrs = Attrs::new();
    attrs.insert("path".to_string(), Value::from(meta.file_name.clone()));
    attrs.insert("mount_pt".to_string(), Value::from(meta.mount_pt.clone()));
    attrs.insert("fs_type".to_string(), Value::from(meta.fs_type.clone()));
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_path_detection() {
        assert!(is_synthetic_path(UNKNOWN));
        assert!(is_synthetic_path(""));
        assert!(is_synthetic_path("HEATMAP_0"));
        assert!(!is_synthetic_path("/scratch/run/out.h5"));
    }

    #[test]
    fn test_filesystem_name_sanitizes_mount() {
        assert_eq!(
            filesystem_name("lustre", "/scratch/project"),
            "FS_lustre__scratch_project"
        );
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut asm = GraphAssembler::new();
        let mut attrs = Attrs::new();
        attrs.insert("module".to_string(), Value::from("POSIX"));
        assert!(asm.register("Module_1_POSIX".to_string(), EntityKind::Module, attrs));
        assert!(!asm.register(
            "Module_1_POSIX".to_string(),
            EntityKind::Module,
            Attrs::new()
        ));
        assert_eq!(asm.entities.len(), 1);
        // original attributes survive the second registration
        assert_eq!(asm.entities[0].attrs["module"], Value::from("POSIX"));
    }
}

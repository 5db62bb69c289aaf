//! Job-level metadata and the static mount table

use std::collections::BTreeMap;

use serde::Serialize;

/// Job header fields, all optional individually; the parser fails the
/// document only when none of them were seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobMetadata {
    pub job_id: Option<String>,
    pub uid: Option<i64>,
    pub nprocs: Option<i64>,
    pub runtime: Option<f64>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub exe: Option<String>,
    pub log_version: Option<String>,
}

impl JobMetadata {
    /// True when not a single header field was recognized
    pub fn is_empty(&self) -> bool {
        self.job_id.is_none()
            && self.uid.is_none()
            && self.nprocs.is_none()
            && self.runtime.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.exe.is_none()
            && self.log_version.is_none()
    }
}

/// Static mount configuration: mount point -> filesystem type
///
/// Ordered so the Job attribute map serializes identically run to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MountTable {
    entries: BTreeMap<String, String>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mount_pt: impl Into<String>, fs_type: impl Into<String>) {
        self.entries.insert(mount_pt.into(), fs_type.into());
    }

    pub fn get(&self, mount_pt: &str) -> Option<&str> {
        self.entries.get(mount_pt).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest-prefix match of a file path against the mount points.
    /// Returns `(mount_pt, fs_type)` for the deepest mount containing
    /// the path.
    pub fn resolve(&self, path: &str) -> Option<(&str, &str)> {
        self.entries
            .iter()
            .filter(|(mount, _)| path.starts_with(mount.as_str()))
            .max_by_key(|(mount, _)| mount.len())
            .map(|(mount, fs)| (mount.as_str(), fs.as_str()))
    }
}

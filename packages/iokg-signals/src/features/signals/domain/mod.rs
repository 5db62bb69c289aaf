//! Signal domain models

mod formula;
mod inputs;

pub use formula::{FormulaScope, FormulaSpec, RECORD_FORMULAS};
pub use inputs::{HeatmapProfile, RecordInputs};

/// Aggregation level at which a signal is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Job,
    Module,
    Record,
}

/// I/O interface layer a module section belongs to
///
/// Classification is by substring so suffixed section names from newer
/// instrumentation versions still land in the right family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Posix,
    Stdio,
    Mpiio,
    Heatmap,
    /// Module the formula table has no entries for (e.g. LUSTRE)
    Other,
}

impl ModuleKind {
    pub fn classify(module: &str) -> Self {
        if module.contains("HEATMAP") {
            ModuleKind::Heatmap
        } else if module.contains("POSIX") {
            ModuleKind::Posix
        } else if module.contains("STDIO") {
            ModuleKind::Stdio
        } else if module.contains("MPI-IO") || module.contains("MPIIO") {
            ModuleKind::Mpiio
        } else {
            ModuleKind::Other
        }
    }

    /// Counter-name prefix used by this module family
    pub fn counter_prefix(&self) -> Option<&'static str> {
        match self {
            ModuleKind::Posix => Some("POSIX"),
            ModuleKind::Stdio => Some("STDIO"),
            ModuleKind::Mpiio => Some("MPIIO"),
            ModuleKind::Heatmap => Some("HEATMAP"),
            ModuleKind::Other => None,
        }
    }

    /// Byte-stream modules carry the generic performance family and
    /// participate in module/job aggregation; HEATMAP does not.
    pub fn is_byte_stream(&self) -> bool {
        matches!(self, ModuleKind::Posix | ModuleKind::Stdio | ModuleKind::Mpiio)
    }
}

//! # iokg-graph
//!
//! Assembles the typed entity-relationship graph from parsed counter
//! logs and their derived signals. Six entity types (Application, Job,
//! Module, Record, File, FileSystem) with deterministic identity names
//! and conditional edge rules; the serialized artifact is stable
//! byte-for-byte across reruns.
//!
//! ```
//! use iokg_graph::process_document;
//!
//! let log = "\
//! ## jobid: 42
//! ## exe: /apps/bin/ior
//! ## POSIX module data
//! POSIX\t0\t7\tPOSIX_BYTES_READ\t4096\t/scratch/in.dat\t/scratch\tlustre
//! ";
//! let artifact = process_document(log).unwrap();
//! assert!(artifact.entities.iter().any(|e| e.name == "Job_42"));
//! assert!(artifact.entities.iter().any(|e| e.name == "FS_lustre__scratch"));
//! ```

pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod pipeline;

pub use domain::{
    attach_signals, Attrs, Entity, EntityKind, GraphArtifact, RelationKind, Relationship,
};
pub use error::{GraphError, Result};
pub use infrastructure::GraphAssembler;
pub use pipeline::{process_document, process_document_with, process_documents};

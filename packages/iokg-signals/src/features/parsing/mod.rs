//! Parsing Feature
//!
//! Converts a darshan-parser text dump into the counter table plus
//! job/mount metadata.
//!
//! ## Structure
//! - `domain/` - ParsedLog, ParseOptions models
//! - `application/` - ParseLogUseCase
//! - `infrastructure/` - line scanner
//!
//! The scanner is a single left-to-right pass over the document with
//! an explicit section state. Record lines are attributed to the
//! section they appear in, never matched globally, so a record id
//! reappearing under another module starts a fresh counter bucket.

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-exports
pub use application::{parse_document, parse_document_with, ParseLogUseCase};
pub use domain::{ParseOptions, ParsedLog};

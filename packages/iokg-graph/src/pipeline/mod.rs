//! Document processing pipeline

mod processor;

pub use processor::{process_document, process_document_with, process_documents};

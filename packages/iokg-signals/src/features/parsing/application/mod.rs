//! Parse use case

use crate::errors::Result;
use crate::features::parsing::domain::{ParseOptions, ParsedLog};
use crate::features::parsing::infrastructure::scan;

/// Use case wrapper around the scanner, holding parser configuration
#[derive(Debug, Default, Clone, Copy)]
pub struct ParseLogUseCase {
    options: ParseOptions,
}

impl ParseLogUseCase {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn execute(&self, text: &str) -> Result<ParsedLog> {
        scan(text, &self.options)
    }
}

/// Parse a document with default options
pub fn parse_document(text: &str) -> Result<ParsedLog> {
    ParseLogUseCase::default().execute(text)
}

/// Parse a document with explicit options
pub fn parse_document_with(text: &str, options: ParseOptions) -> Result<ParsedLog> {
    ParseLogUseCase::new(options).execute(text)
}

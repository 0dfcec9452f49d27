//! Error types for Merfolk operations.
//!
//! This module provides the main error type [`MerfolkError`] which wraps the
//! error conditions that can occur while transpiling documents.

use std::io;

use thiserror::Error;

use merfolk_parser::error::ParseError;

use crate::document::DocumentError;

/// The main error type for Merfolk operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the block source next to the diagnostics so
/// their spans can be rendered against it.
#[derive(Debug, Error)]
pub enum MerfolkError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("{document}: {err}")]
    Document { document: String, err: DocumentError },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl MerfolkError {
    /// Create a new `Parse` error with the associated block source.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}

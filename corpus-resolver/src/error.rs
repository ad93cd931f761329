//! Error types for corpus-resolver
//!
//! Only the work resolver turns an empty match into `NotFound`; the matcher
//! itself returns empty lists.

use crate::domain::Domain;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for corpus-resolver
#[derive(Error, Debug)]
pub enum Error {
    /// No domain yielded a match after all fallbacks
    #[error(
        "Could not find a work that met this criterion: {work} (movement: {}, extensions: {})",
        describe_movement(.movement),
        describe_extensions(.extensions)
    )]
    NotFound {
        work: String,
        movement: Option<String>,
        extensions: Vec<String>,
    },

    /// Local path registration rejected
    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// A domain was explicitly queried but cannot be enumerated
    #[error("Corpus domain '{domain}' unavailable at {path}")]
    DomainUnavailable { domain: Domain, path: PathBuf },

    /// Compressed container packaging errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Metadata bundle (de)serialization errors
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// corpus-common error
    #[error("Common error: {0}")]
    Common(#[from] corpus_common::Error),
}

fn describe_movement(movement: &Option<String>) -> &str {
    movement.as_deref().unwrap_or("any")
}

fn describe_extensions(extensions: &[String]) -> String {
    if extensions.is_empty() {
        "any".to_string()
    } else {
        extensions.join(", ")
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Archive(err.to_string())
    }
}

/// Convenience Result type using corpus-resolver Error
pub type Result<T> = std::result::Result<T, Error>;

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving metadata or driving the tagging tool.
///
/// Only [`Error::ToolNotFound`] is meant to stop a whole run. Everything else
/// is contained at directory or file granularity by the caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("exiftool not found (searched {searched}). Install with: brew install exiftool")]
    ToolNotFound { searched: String },

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Cannot read directory {path}: {source}")]
    UnreadableDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory has no metadata file: {0}")]
    MetadataFileMissing(PathBuf),

    #[error("Invalid metadata file {path}: {reason}")]
    InvalidMetadata { path: PathBuf, reason: String },

    #[error("{path} is missing {field}")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("Tag write failed for {path}: {reason}")]
    TagWrite { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

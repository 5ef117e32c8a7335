//! Error handling for record discovery, parsing and reporting.
//!
//! Discovery and metadata inference never fail; the errors here come from
//! reading individual record files, writing reports and validating
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AfadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Record file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("No numeric samples in record file: {path} ({lines_read} lines read)")]
    EmptyOrUnparsable { path: PathBuf, lines_read: usize },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing failed for: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },

    #[error("Remote analysis unavailable: {reason}")]
    RemoteUnavailable { reason: String },
}

impl AfadError {
    /// Classify the error for per-record failure lists
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            AfadError::FileNotFound { .. } => FailureKind::NotFound,
            AfadError::EmptyOrUnparsable { .. } => FailureKind::Unparsable,
            _ => FailureKind::ReadFailed,
        }
    }
}

/// Why a single record produced no data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// No file for this event/station/direction, or it vanished before reading
    NotFound,
    /// The file exists but yielded zero numeric samples
    Unparsable,
    /// Any other read error
    ReadFailed,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NotFound => "not_found",
            FailureKind::Unparsable => "unparsable",
            FailureKind::ReadFailed => "read_failed",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, AfadError>;

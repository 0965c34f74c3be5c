//! Error types for report generation

use std::path::PathBuf;
use thiserror::Error;

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Report errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// The pass/fail gate found a failure
    #[error("Failed for {app} ({stage})")]
    Failed { app: String, stage: String },

    /// The key does not name a stage
    #[error("Unknown report key '{0}'. Expected one of: build, test, scan")]
    UnknownKey(String),

    /// A record has no string `name`
    #[error("Record {index} has no \"name\" field")]
    MissingName { index: usize },

    /// A report file is not a JSON array of objects
    #[error("Expected a JSON array of objects in {0}")]
    NotAnArray(PathBuf),

    /// No file matched the input pattern
    #[error("No input files found matching '{0}'")]
    NoInputFiles(String),

    /// Invalid glob pattern
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// Whether this error is the failure gate tripping
    pub fn is_gate_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

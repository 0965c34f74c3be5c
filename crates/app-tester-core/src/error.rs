//! Error types for the app tester

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using TesterError
pub type Result<T> = std::result::Result<T, TesterError>;

/// Main error type for app tester operations
///
/// Only fatal conditions are represented here. A device that fails to build
/// or test is a `Fail` result, not an error.
#[derive(Debug, Error)]
pub enum TesterError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Command execution errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Workspace (clone) errors
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// Variant discovery errors
    #[error(transparent)]
    Variant(#[from] VariantError),

    /// Input file does not exist
    #[error("Input file does not exist: {0}")]
    InputNotFound(PathBuf),

    /// Required tool is missing from PATH
    #[error("Required tool '{tool}' not found. {install_hint}")]
    ToolNotFound { tool: String, install_hint: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Command execution errors
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be started
    #[error("Failed to spawn '{command}' in {cwd}: {message}")]
    SpawnFailed {
        command: String,
        cwd: PathBuf,
        message: String,
    },

    /// The command exited with a nonzero status and failures were not allowed
    #[error("Command '{command}' failed in {cwd} (exit code {exit_code:?})")]
    Failed {
        command: String,
        cwd: PathBuf,
        exit_code: Option<i32>,
        output: String,
    },

    /// The command exceeded its wall-clock budget
    #[error("Command '{command}' timed out after {limit:?}")]
    Timeout { command: String, limit: Duration },
}

/// Workspace (git clone) errors
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Clone failed
    #[error("Failed to clone {url} into {path}")]
    CloneFailed { url: String, path: PathBuf },

    /// Fetch failed on an existing clone
    #[error("Failed to fetch in {0}")]
    FetchFailed(PathBuf),

    /// Checkout failed and the clone was removed
    #[error("Checkout of '{git_ref}' failed, {path} was removed")]
    CheckoutFailed { git_ref: String, path: PathBuf },

    /// Could not remove a corrupted clone
    #[error("Failed to remove workspace {path}: {message}")]
    CleanupFailed { path: PathBuf, message: String },
}

/// Variant discovery errors
#[derive(Debug, Error)]
pub enum VariantError {
    /// The Makefile output did not contain a VARIANTS line
    #[error("Invalid variants retrieved: {0}")]
    Missing(String),

    /// A VARIANTS line was found but declared no variant
    #[error("At least one variant should be defined in the app Makefile (parameter {0})")]
    Empty(String),
}

impl TesterError {
    /// Create a tool not found error with install hint
    pub fn tool_not_found(tool: impl Into<String>, install_hint: impl Into<String>) -> Self {
        Self::ToolNotFound {
            tool: tool.into(),
            install_hint: install_hint.into(),
        }
    }

    /// Whether this error comes from bad configuration or input
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::InputNotFound(_) | Self::Json(_)
        )
    }
}

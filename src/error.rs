//! Error handling module for pideploy
//!
//! Provides centralized error handling with proper error types using thiserror.
//! All errors in the application should use these types for consistency.

use thiserror::Error;

/// Main error type for pideploy
#[derive(Error, Debug)]
pub enum DeployError {
    /// IO errors (file operations, log writes, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// External command errors (spawn failures, non-zero exits)
    #[error("Command failed: {0}")]
    Command(String),

    /// Missing or unusable source checkout
    #[error("Checkout error: {0}")]
    Checkout(String),

    /// Source control errors (failed pull)
    #[error("Git error: {0}")]
    Git(String),

    /// Virtual environment creation/activation errors
    #[error("Virtualenv error: {0}")]
    Venv(String),

    /// Dependency installation errors
    #[error("Dependency install error: {0}")]
    Dependency(String),

    /// Missing application entry point
    #[error("Entry point error: {0}")]
    EntryPoint(String),

    /// Systemd unit installation/lifecycle errors
    #[error("Systemd error: {0}")]
    Systemd(String),

    /// Crontab registration errors
    #[error("Crontab error: {0}")]
    Crontab(String),

    /// Validation errors (user input, config values)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Interactive prompt errors (terminal state, read failures)
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for pideploy operations
pub type Result<T> = std::result::Result<T, DeployError>;

// Convenient error constructors
impl DeployError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an external command error
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    /// Create a checkout error
    pub fn checkout(msg: impl Into<String>) -> Self {
        Self::Checkout(msg.into())
    }

    /// Create a source control error
    pub fn git(msg: impl Into<String>) -> Self {
        Self::Git(msg.into())
    }

    /// Create a virtualenv error
    pub fn venv(msg: impl Into<String>) -> Self {
        Self::Venv(msg.into())
    }

    /// Create a dependency install error
    pub fn dependency(msg: impl Into<String>) -> Self {
        Self::Dependency(msg.into())
    }

    /// Create an entry point error
    pub fn entry_point(msg: impl Into<String>) -> Self {
        Self::EntryPoint(msg.into())
    }

    /// Create a systemd error
    pub fn systemd(msg: impl Into<String>) -> Self {
        Self::Systemd(msg.into())
    }

    /// Create a crontab error
    pub fn crontab(msg: impl Into<String>) -> Self {
        Self::Crontab(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a prompt error
    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt(msg.into())
    }
}

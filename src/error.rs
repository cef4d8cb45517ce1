//! Error types for the dashboard
//!
//! Two layers, both defined with thiserror:
//! - [`WidgetError`]: failures of a widget's background work. These are cloned
//!   into events, stored in widget state and rendered as `Error: <cause>`.
//!   They never reach the controller.
//! - [`DashError`]: the few conditions that stop the process (terminal setup,
//!   configuration), propagated with `?` up to `main`.

use thiserror::Error;

/// Failure of a single widget command (fetch, sample, file read)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// Network request failed or timed out
    #[error("{0}")]
    Fetch(String),

    /// Remote API answered with a non-success status
    #[error("API status: {0} {1}")]
    Status(u16, String),

    /// Response or local data could not be decoded
    #[error("{0}")]
    Parse(String),

    /// Local file or OS counter could not be read
    #[error("{0}")]
    Io(String),
}

impl From<reqwest::Error> for WidgetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WidgetError::Parse(err.to_string())
        } else {
            WidgetError::Fetch(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(err: serde_json::Error) -> Self {
        WidgetError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for WidgetError {
    fn from(err: std::io::Error) -> Self {
        WidgetError::Io(err.to_string())
    }
}

impl From<nix::Error> for WidgetError {
    fn from(err: nix::Error) -> Self {
        WidgetError::Io(err.desc().to_string())
    }
}

impl From<tokio::time::error::Elapsed> for WidgetError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        WidgetError::Fetch("request timed out".to_string())
    }
}

/// Main error type for dashboard startup and teardown
#[derive(Error, Debug)]
pub enum DashError {
    /// Terminal could not be put into (or restored from) dashboard mode
    #[error("Terminal error: {0}")]
    Terminal(#[source] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashError>;

/// Convert anyhow::Error to DashError
impl From<anyhow::Error> for DashError {
    fn from(err: anyhow::Error) -> Self {
        DashError::Other(err.to_string())
    }
}

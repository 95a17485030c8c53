//! Error types module.
//!
//! Every failure in netopt ends up in a single [`Error`] enum whose
//! `Display` text carries the underlying OS or library message, so the
//! interactive window can show it verbatim in a dialog.

use thiserror::Error;

/// A specialized `Result` type for netopt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the netopt application.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (process spawning, config files, terminal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (configuration files, JSON output)
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// DNS resolver error while looking up a speed-test host
    #[error("DNS resolver error: {0}")]
    Resolver(#[from] trust_dns_resolver::error::ResolveError),

    /// HTTP error talking to a speed-test server
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// DNS servers could not be applied
    #[error("Error changing DNS: {0}")]
    Dns(String),

    /// Adapter MTU could not be applied
    #[error("Error setting adapter MTU: {0}")]
    Adapter(String),

    /// The speed-test facility failed
    #[error("Error running speed test: {0}")]
    SpeedTest(String),

    /// Network-related error (unreachable servers, ICMP setup)
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration error (invalid values, unknown profile)
    #[error("Config error: {0}")]
    Config(String),

    /// Privilege elevation failed
    #[error("Elevation error: {0}")]
    Elevation(String),

    /// TUI (terminal UI) related error
    #[error("TUI error: {0}")]
    Tui(String),
}

impl Error {
    /// Create a new network error with a message.
    #[must_use]
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new TUI error with a message.
    #[must_use]
    pub fn tui(msg: impl Into<String>) -> Self {
        Self::Tui(msg.into())
    }

    /// Create a new elevation error with a message.
    #[must_use]
    pub fn elevation(msg: impl Into<String>) -> Self {
        Self::Elevation(msg.into())
    }
}

impl From<color_eyre::Report> for Error {
    fn from(e: color_eyre::Report) -> Self {
        Self::Config(e.to_string())
    }
}

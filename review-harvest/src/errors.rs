//! Error types for the review harvester.
//!
//! Only setup failures (bad selectors, unreadable config, HTTP client
//! construction) ever reach a caller, through [`crate::Harvester::new`] or
//! `try_harvest`.
//! Per-page transport failures are absorbed by the pagination planner and
//! surface only as counters in [`crate::HarvestStats`].

use thiserror::Error;

/// The main error type for harvesting operations.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The transport failed before a response was received.
    #[error("Transport error fetching {url}: {message}")]
    Transport {
        /// The URL being fetched.
        url: String,
        /// Underlying transport message.
        message: String,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL being fetched.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// A selector in the selector table failed to compile.
    #[error("Invalid selector for '{field}' ({selector}): {message}")]
    Selector {
        /// Logical field name in the selector table.
        field: String,
        /// The offending selector string.
        selector: String,
        /// Parser message.
        message: String,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Creates a transport error.
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from fetching a single page.
    ///
    /// Page-level errors are isolated by the planner; everything else is a
    /// setup error.
    #[must_use]
    pub const fn is_page_level(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }
}

/// Result alias used throughout the crate.
pub type HarvestResult<T> = Result<T, HarvestError>;

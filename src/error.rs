//! Error types for subgraph-probe.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for subgraph-probe operations.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Query template errors (empty template, missing keyword, bad placeholders).
    #[error("Query error: {0}")]
    Query(String),

    /// Validation snippet errors (unreadable snippet file, malformed bindings).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport errors (proxy unreachable, malformed proxy response).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Errors reported by the proxy itself (missing credential, bad request).
    #[error("Proxy error: {0}")]
    Proxy(String),

    /// State database errors (open failure, constraint violations, etc.)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProbeError {
    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a proxy error with the given message.
    pub fn proxy(msg: impl Into<String>) -> Self {
        Self::Proxy(msg.into())
    }

    /// Creates a persistence error with the given message.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Query(_) => "Query Error",
            Self::Validation(_) => "Validation Error",
            Self::Transport(_) => "Transport Error",
            Self::Proxy(_) => "Proxy Error",
            Self::Persistence(_) => "Persistence Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using ProbeError.
pub type Result<T> = std::result::Result<T, ProbeError>;

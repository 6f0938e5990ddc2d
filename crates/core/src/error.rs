//! Error types for the DeepFish bridge.

use thiserror::Error;

/// Result type alias using the bridge's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the bridge.
///
/// The first five variants are the per-request taxonomy the gateway maps to
/// HTTP statuses. Everything else surfaces as a remote fault.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Request Errors
    // =========================================================================
    /// Bad JSON or a missing required field.
    #[error("{0}")]
    MalformedRequest(String),

    /// A collaborator failed to initialize at startup.
    #[error("{0} service unavailable")]
    ServiceUnavailable(String),

    /// No route matches the request.
    #[error("Not Found")]
    NotFound,

    /// The body exceeds the configured size limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// A collaborator call raised.
    #[error("{0}")]
    RemoteFault(String),

    // =========================================================================
    // Startup Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gateway error: {0}")]
    Gateway(String),
}

impl Error {
    /// Create a malformed request error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    /// Create a service unavailable error for the named service.
    pub fn unavailable(service: impl Into<String>) -> Self {
        Self::ServiceUnavailable(service.into())
    }

    /// Create a remote fault.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteFault(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a gateway error.
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

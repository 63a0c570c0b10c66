//! Error types for metricskv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using MetricsError
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type for metricskv operations
#[derive(Debug, Error)]
pub enum MetricsError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    /// Connect/send/receive/close failed. Fatal to the client or connection.
    #[error("socket error ({context}): {source}")]
    Socket {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Request Errors (answered with an error reply, connection stays open)
    // -------------------------------------------------------------------------
    /// The offending line is kept for logging; the wire only sees the fixed text.
    #[error("wrong command")]
    Parse(String),

    #[error("{0}")]
    Execution(String),

    // -------------------------------------------------------------------------
    // Client-side Reply Errors
    // -------------------------------------------------------------------------
    /// The server answered with an `error` status
    #[error("{0}")]
    Protocol(String),

    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// Refused locally before anything was sent
    #[error("invalid key {0:?}")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MetricsError {
    /// Wrap an I/O error raised by a socket operation
    pub fn socket(context: &'static str, source: std::io::Error) -> Self {
        MetricsError::Socket { context, source }
    }

    /// Faults caused by the request itself rather than the transport.
    ///
    /// The connection handler answers these with an error reply.
    pub fn is_request_fault(&self) -> bool {
        matches!(self, MetricsError::Parse(_) | MetricsError::Execution(_))
    }
}

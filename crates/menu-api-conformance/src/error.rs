//! Error types for conformance runs.
//!
//! Two layers: [`ConformanceError`] is raised while a run is being set up and
//! is the only error a caller ever sees. [`ProbeError`] describes a failed
//! HTTP exchange inside a single check and is always folded into that check's
//! result.

use thiserror::Error;

/// Errors raised before a conformance run starts.
#[derive(Debug, Error)]
pub enum ConformanceError {
    /// The target base URL could not be parsed.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A requested check id is not in the registry.
    #[error("unknown check id: {0}")]
    UnknownCheck(String),

    /// Configuration error (e.g. an empty selection).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Convenience result type for conformance operations.
pub type ConformanceResult<T> = Result<T, ConformanceError>;

/// Failure to complete or decode a single probe exchange.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request exceeded its timeout.
    #[error("request timed out after {timeout_ms}ms: {message}")]
    Timeout { timeout_ms: u64, message: String },

    /// Connection refused, DNS failure, TLS failure, or any other
    /// transport-level problem.
    #[error("request failed: {0}")]
    Transport(String),

    /// The body was not valid JSON where JSON was expected.
    #[error("malformed JSON body: {reason} (body: {body})")]
    MalformedBody { reason: String, body: String },
}

impl ProbeError {
    /// Build a probe error from a reqwest failure, keeping its source chain
    /// so that "connection refused" style causes reach the details string.
    pub fn from_reqwest(err: &reqwest::Error, timeout_ms: u64) -> Self {
        let message = error_chain(err);
        if err.is_timeout() {
            Self::Timeout {
                timeout_ms,
                message,
            }
        } else {
            Self::Transport(message)
        }
    }
}

/// Render an error and all of its sources as `outer: inner: root`.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

//! Error taxonomy for the session client and resource API.
//!
//! The session client and resource API return [`ArrayError`], a typed leaf
//! error. Everything above them (the transaction engine, the volume
//! creators, the `CreateVolumeFromParameters` entry point) works in
//! `anyhow::Result` and attaches operation/target context as it propagates,
//! per §7 of the design.

use thiserror::Error;

/// A typed error returned by the session client or a resource-API operation.
#[derive(Debug, Error)]
pub enum ArrayError {
    /// Transport-level failure: connection refused, TLS handshake failure,
    /// timeout. Classified as "unconnected" in the design; triggers one
    /// relogin+retry attempt per outer call.
    #[error("unconnected: {0}")]
    Transport(#[source] reqwest::Error),

    /// Application-level `code == -401`: the session token has expired.
    /// Treated like a transport error by the session client.
    #[error("auth expired")]
    AuthExpired,

    /// Wrong password or IP lock: the backend is flagged offline and the
    /// caller sees a non-retryable error.
    #[error("permanent auth failure ({code}): {description}")]
    PermanentAuthFailure { code: i64, description: String },

    /// Any other non-zero application error code, not tolerated by the
    /// calling resource-API operation.
    #[error("{op} failed ({code}): {description}")]
    Application {
        op: String,
        code: i64,
        description: String,
    },

    /// The response body didn't parse as the expected envelope/shape.
    #[error("failed to decode array response: {0}")]
    Decode(#[source] serde_json::Error),

    /// An object the caller expected to exist was not found.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// A parameter/request validation failure, raised before any network
    /// I/O.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backend was already marked offline by a prior permanent auth
    /// failure.
    #[error("backend {0} is offline")]
    BackendOffline(String),
}

impl ArrayError {
    /// True for conditions that should trigger a relogin-and-retry.
    pub fn triggers_relogin(&self) -> bool {
        matches!(self, ArrayError::Transport(_) | ArrayError::AuthExpired)
    }

    /// The numeric array error code, when this variant carries one.
    pub fn code(&self) -> Option<i64> {
        match self {
            ArrayError::PermanentAuthFailure { code, .. } => Some(*code),
            ArrayError::Application { code, .. } => Some(*code),
            _ => None,
        }
    }
}

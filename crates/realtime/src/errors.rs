//! Error types for the real-time messaging layer.

use thiserror::Error;

pub type RealtimeResult<T> = Result<T, RealtimeError>;

#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("invalid group name: {reason}")]
    InvalidGroup { reason: String },

    #[error("failed to sign access token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("web pubsub request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("web pubsub returned {status}: {body}")]
    ServiceStatus { status: u16, body: String },

    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl RealtimeError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

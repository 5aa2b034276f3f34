//! Error types for chat resolution.

use incontact_database::DatabaseError;
use thiserror::Error;

/// Result type alias for chat resolution
pub type ChatResult<T> = Result<T, ChatResolverError>;

/// Failures surfaced by [`crate::ChatResolver`] and its collaborators.
///
/// Collaborator failures are passed through untouched; nothing here retries.
#[derive(Debug, Error)]
pub enum ChatResolverError {
    #[error("chat resolution requires exactly 2 participants, got {count}")]
    InvalidParticipants { count: usize },

    #[error("both participants refer to the same user: {identifier}")]
    DuplicateParticipant { identifier: String },

    #[error("local chat store error: {0}")]
    Store(#[from] DatabaseError),

    #[error("on-behalf-of token exchange failed: {message}")]
    TokenExchange { message: String },

    #[error("graph request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("graph returned {status}: {body}")]
    GraphStatus { status: u16, body: String },

    #[error("invalid graph response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl ChatResolverError {
    pub fn token_exchange(message: impl Into<String>) -> Self {
        Self::TokenExchange {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for failures raised before any collaborator was contacted.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidParticipants { .. } | Self::DuplicateParticipant { .. }
        )
    }
}

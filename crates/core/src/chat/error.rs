//! Error types for the chat module.

use thiserror::Error;

/// Errors from the chat-platform collaborator.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The message to edit no longer exists (deleted by the user).
    /// Non-fatal: callers fall back to sending a fresh message.
    #[error("Message to edit not found")]
    MessageMissing,

    /// The platform refused the payload, typically an oversize attachment.
    /// Triggers the one automatic fallback to remote upload.
    #[error("Payload rejected: {reason}")]
    PayloadRejected { reason: String },

    /// Any other API-level rejection.
    #[error("Chat API error: {reason}")]
    Api { reason: String },

    /// Transport failure before the platform answered.
    #[error("Chat network error: {0}")]
    Network(String),
}

impl ChatError {
    /// Creates a payload rejection.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::PayloadRejected {
            reason: reason.into(),
        }
    }

    /// Creates a generic API error.
    pub fn api(reason: impl Into<String>) -> Self {
        Self::Api {
            reason: reason.into(),
        }
    }
}

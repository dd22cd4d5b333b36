//! Error types for the uploader module.

use thiserror::Error;

/// Errors from a remote upload.
///
/// Uploads already stream chunk by chunk without internal retries; a failed
/// multi-hundred-megabyte upload is surfaced as terminal for the user to
/// re-trigger rather than retried automatically.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Reading the source file failed.
    #[error("Failed to read upload source: {0}")]
    Io(#[from] std::io::Error),

    /// The request failed in transit.
    #[error("Upload request failed: {0}")]
    Http(String),

    /// The provider answered with a non-success status.
    #[error("{provider} upload rejected: HTTP {status}: {body}")]
    Rejected {
        provider: String,
        status: u16,
        body: String,
    },
}

impl UploadError {
    /// Creates a rejection with a bounded body excerpt.
    pub fn rejected(provider: impl Into<String>, status: u16, body: &str) -> Self {
        Self::Rejected {
            provider: provider.into(),
            status,
            body: body.chars().take(200).collect(),
        }
    }
}

//! Error types for the delivery module.

use thiserror::Error;

use crate::chat::ChatError;
use crate::config::ConfigError;
use crate::uploader::UploadError;

/// Errors from routing an artifact to the user.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Direct hand-off failed and no fallback remained.
    #[error("Direct delivery failed: {0}")]
    Direct(#[from] ChatError),

    /// The remote upload failed; never retried automatically.
    #[error("Remote upload failed: {0}")]
    Upload(#[from] UploadError),

    /// The selected remote provider is not usable as configured.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

//! Remote upload clients.
//!
//! When an artifact cannot be handed to the chat platform directly it is
//! staged on a remote host and delivered as a URL instead. Every provider
//! implements the same [`RemoteUploader`] capability: stream the file from
//! disk (never buffer it whole), feed cumulative byte counts through the
//! shared progress reporter, return a stable retrievable URL.

mod error;
mod s3;
mod stream;
mod traits;
mod transfersh;

pub use error::UploadError;
pub use s3::ObjectStorageUploader;
pub use stream::file_stream;
pub use traits::RemoteUploader;
pub use transfersh::AnonymousHostUploader;

use crate::config::{ConfigError, UploadConfig, UploadProvider};

/// Creates the uploader selected by configuration.
///
/// Selecting the object-storage provider without its configuration section
/// is a configuration error naming the missing setting, reported to the
/// requester rather than crashing the process.
pub fn create_uploader(config: &UploadConfig) -> Result<Box<dyn RemoteUploader>, ConfigError> {
    match config.provider {
        UploadProvider::AnonymousHost => Ok(Box::new(AnonymousHostUploader::new(
            config.anonymous_host_url.clone(),
        ))),
        UploadProvider::ObjectStorage => {
            let storage = config.object_storage.as_ref().ok_or_else(|| {
                ConfigError::ValidationError(
                    "upload.object_storage.bucket must be set when provider = \"object_storage\""
                        .to_string(),
                )
            })?;
            if storage.bucket.is_empty() {
                return Err(ConfigError::ValidationError(
                    "upload.object_storage.bucket must not be empty".to_string(),
                ));
            }
            Ok(Box::new(ObjectStorageUploader::new(storage.clone())))
        }
    }
}

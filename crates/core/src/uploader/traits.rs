//! Trait definitions for the uploader module.

use async_trait::async_trait;
use std::path::Path;

use crate::progress::ProgressReporter;

use super::error::UploadError;

/// A remote host that can stage an artifact and return a URL for it.
#[async_trait]
pub trait RemoteUploader: Send + Sync + std::fmt::Debug {
    /// Returns the name of this provider.
    fn name(&self) -> &str;

    /// Streams the file at `path` to the remote host.
    ///
    /// Cumulative sent-byte counts flow through `reporter` at the reporter's
    /// own granularity. Returns a stable, retrievable URL on success. No
    /// automatic retries.
    async fn upload(&self, path: &Path, reporter: &ProgressReporter)
        -> Result<String, UploadError>;
}

//! Mock remote uploader for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::progress::{ProgressEvent, ProgressReporter};
use crate::uploader::{RemoteUploader, UploadError};

#[derive(Debug)]
enum MockOutcome {
    Url(String),
    Error(String),
}

/// Mock implementation of the RemoteUploader trait.
///
/// Records the paths it was asked to upload and resolves to a fixed URL or
/// a fixed failure.
#[derive(Clone, Debug)]
pub struct MockUploader {
    outcome: Arc<MockOutcome>,
    uploads: Arc<RwLock<Vec<PathBuf>>>,
}

impl MockUploader {
    /// Create a mock that resolves every upload to `url`.
    pub fn succeeding(url: &str) -> Self {
        Self {
            outcome: Arc::new(MockOutcome::Url(url.to_string())),
            uploads: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a mock that fails every upload with `reason`.
    pub fn failing(reason: &str) -> Self {
        Self {
            outcome: Arc::new(MockOutcome::Error(reason.to_string())),
            uploads: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get all recorded upload paths.
    pub async fn uploads(&self) -> Vec<PathBuf> {
        self.uploads.read().await.clone()
    }
}

#[async_trait]
impl RemoteUploader for MockUploader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(
        &self,
        path: &Path,
        reporter: &ProgressReporter,
    ) -> Result<String, UploadError> {
        self.uploads.write().await.push(path.to_path_buf());
        match self.outcome.as_ref() {
            MockOutcome::Url(url) => {
                let size = tokio::fs::metadata(path).await.map(|m| m.len()).ok();
                reporter
                    .report(ProgressEvent::uploading(size.unwrap_or(0), size))
                    .await;
                Ok(url.clone())
            }
            MockOutcome::Error(reason) => Err(UploadError::Http(reason.clone())),
        }
    }
}

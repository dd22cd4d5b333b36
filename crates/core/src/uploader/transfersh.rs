//! Anonymous-hosting uploader (transfer.sh style streaming PUT).

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::progress::{ProgressEvent, ProgressReporter};

use super::error::UploadError;
use super::stream::file_stream;
use super::traits::RemoteUploader;

/// Overall request timeout; uploads of large artifacts take a while.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Uploader that PUTs the file to an anonymous hosting endpoint and reads
/// the download URL from the response body.
#[derive(Debug)]
pub struct AnonymousHostUploader {
    client: Client,
    base_url: String,
}

impl AnonymousHostUploader {
    /// Creates an uploader for the given endpoint base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RemoteUploader for AnonymousHostUploader {
    fn name(&self) -> &str {
        "anonymous-host"
    }

    async fn upload(
        &self,
        path: &Path,
        reporter: &ProgressReporter,
    ) -> Result<String, UploadError> {
        let size = tokio::fs::metadata(path).await?.len();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let target = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&filename)
        );

        let (count_tx, mut count_rx) = mpsc::unbounded_channel();
        let drain = tokio::spawn({
            let reporter = reporter.clone();
            async move {
                while let Some(sent) = count_rx.recv().await {
                    reporter.report(ProgressEvent::uploading(sent, Some(size))).await;
                }
            }
        });

        debug!("Uploading {:?} ({} bytes) to {}", path, size, target);
        let file = tokio::fs::File::open(path).await?;
        let response = self
            .client
            .put(&target)
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(file_stream(file, Some(count_tx))))
            .send()
            .await
            .map_err(|e| UploadError::Http(e.to_string()))?;

        // The body stream is dropped by now, so the drain task has ended.
        let _ = drain.await;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Http(e.to_string()))?;

        if status.as_u16() == 200 || status.as_u16() == 201 {
            let url = body.trim().to_string();
            info!("Upload finished: {}", url);
            Ok(url)
        } else {
            Err(UploadError::rejected(self.name(), status.as_u16(), &body))
        }
    }
}

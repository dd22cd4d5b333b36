//! Pipeline runner.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::artifact::{locate_artifact, ArtifactError};
use crate::chat::{ChatApi, ChatId, StatusMessage};
use crate::delivery::{DeliveryOutcome, DeliveryRouter};
use crate::extractor::{AcquisitionError, AcquisitionRequest, FormatSelection, MediaExtractor};
use crate::progress::{ProgressReporter, DEFAULT_MIN_INTERVAL};

use super::workdir::WorkDir;

/// Capacity of the per-request progress channel. When the extractor outruns
/// the reporter, excess samples are dropped at the sending side.
const PROGRESS_CHANNEL_CAPACITY: usize = 64;

/// Longest failure reason shown to the user.
const MAX_REASON_CHARS: usize = 500;

/// One media request to run end to end.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    /// Chat the request came from; status and artifact go back there.
    pub chat: ChatId,
    /// Source media URL.
    pub source_url: String,
    /// The encoding the user picked.
    pub selection: FormatSelection,
}

#[derive(Debug, Error)]
enum PipelineError {
    #[error("{0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("{0}")]
    Artifact(#[from] ArtifactError),

    #[error("Failed to create working directory: {0}")]
    WorkDir(std::io::Error),
}

/// Runs one request from acquisition to delivery.
///
/// The pipeline itself is shared and stateless; everything mutable (working
/// directory, status message, reporter) is created per [`Pipeline::run`]
/// call, so concurrent requests never interfere.
pub struct Pipeline {
    extractor: Arc<dyn MediaExtractor>,
    chat: Arc<dyn ChatApi>,
    router: DeliveryRouter,
    work_root: PathBuf,
    progress_interval: Duration,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn MediaExtractor>,
        chat: Arc<dyn ChatApi>,
        router: DeliveryRouter,
        work_root: PathBuf,
    ) -> Self {
        Self {
            extractor,
            chat,
            router,
            work_root,
            progress_interval: DEFAULT_MIN_INTERVAL,
        }
    }

    /// Overrides the minimum interval between status updates.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Runs the request to completion and returns its terminal outcome.
    ///
    /// The user sees exactly one final status text no matter which stage
    /// failed, and the working directory is gone by the time this returns.
    pub async fn run(&self, request: PipelineRequest) -> DeliveryOutcome {
        let chat = request.chat;
        let status = match StatusMessage::send(Arc::clone(&self.chat), chat, "Starting...").await {
            Ok(status) => Arc::new(status),
            Err(e) => {
                error!("Cannot open status message in chat {}: {}", chat.0, e);
                return DeliveryOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };
        let reporter = ProgressReporter::with_interval(status, self.progress_interval);

        let outcome = match self.execute(&request, &reporter).await {
            Ok(outcome) => outcome,
            Err(e) => DeliveryOutcome::Failed {
                reason: e.to_string(),
            },
        };

        match &outcome {
            DeliveryOutcome::Delivered => {
                info!("Delivered request for {} to chat {}", request.source_url, chat.0);
                reporter.set_text("Done").await;
            }
            DeliveryOutcome::DeliveredViaRemote { url } => {
                info!("Delivered request for {} via {}", request.source_url, url);
                reporter.set_text(&format!("Uploaded:\n{}", url)).await;
            }
            DeliveryOutcome::Failed { reason } => {
                error!("Request for {} failed: {}", request.source_url, reason);
                reporter
                    .set_text(&format!("Failed: {}", truncate_reason(reason)))
                    .await;
            }
        }
        outcome
    }

    async fn execute(
        &self,
        request: &PipelineRequest,
        reporter: &ProgressReporter,
    ) -> Result<DeliveryOutcome, PipelineError> {
        let workdir = WorkDir::create(&self.work_root)
            .await
            .map_err(PipelineError::WorkDir)?;

        let result = self.acquire_and_deliver(request, &workdir, reporter).await;
        workdir.cleanup().await;
        result
    }

    async fn acquire_and_deliver(
        &self,
        request: &PipelineRequest,
        workdir: &WorkDir,
        reporter: &ProgressReporter,
    ) -> Result<DeliveryOutcome, PipelineError> {
        let acquisition = AcquisitionRequest {
            source_url: request.source_url.clone(),
            selection: request.selection.clone(),
            work_dir: workdir.path().to_path_buf(),
        };

        let (tx, mut rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        let drain = async {
            while let Some(event) = rx.recv().await {
                reporter.report(event).await;
            }
        };
        let (acquired, ()) = tokio::join!(self.extractor.acquire(acquisition, tx), drain);
        acquired?;

        let artifact = locate_artifact(workdir.path()).await?;
        Ok(self.router.deliver(request.chat, &artifact, reporter).await)
    }
}

/// Caps a failure reason at a displayable length.
fn truncate_reason(reason: &str) -> String {
    if reason.chars().count() <= MAX_REASON_CHARS {
        return reason.to_string();
    }
    let mut out: String = reason.chars().take(MAX_REASON_CHARS).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;
    use crate::testing::{MockChat, MockExtractor, MockUploader};
    use tempfile::TempDir;

    const MIB: u64 = 1024 * 1024;

    fn request() -> PipelineRequest {
        PipelineRequest {
            chat: ChatId(42),
            source_url: "https://example.com/v".to_string(),
            selection: FormatSelection::Format("22".to_string()),
        }
    }

    fn pipeline(
        root: &TempDir,
        chat: &MockChat,
        extractor: &MockExtractor,
        uploader: &MockUploader,
        ceiling: u64,
    ) -> Pipeline {
        let router = DeliveryRouter::new(
            Arc::new(chat.clone()),
            UploadConfig::default(),
            ceiling,
        )
        .with_uploader(Arc::new(uploader.clone()));
        Pipeline::new(
            Arc::new(extractor.clone()),
            Arc::new(chat.clone()),
            router,
            root.path().to_path_buf(),
        )
    }

    #[tokio::test]
    async fn test_small_artifact_is_delivered_directly() {
        let root = TempDir::new().unwrap();
        let chat = MockChat::new();
        let extractor = MockExtractor::new();
        extractor.add_produced_file("clip.mp4", 5 * MIB).await;
        let uploader = MockUploader::succeeding("https://host/x");

        let outcome = pipeline(&root, &chat, &extractor, &uploader, 50 * MIB)
            .run(request())
            .await;

        assert_eq!(outcome, DeliveryOutcome::Delivered);
        assert_eq!(chat.media_sends().await.len(), 1);
        assert!(uploader.uploads().await.is_empty());
        assert_eq!(chat.last_status_text().await.as_deref(), Some("Done"));
    }

    #[tokio::test]
    async fn test_working_directory_is_removed_on_success() {
        let root = TempDir::new().unwrap();
        let chat = MockChat::new();
        let extractor = MockExtractor::new();
        extractor.add_produced_file("clip.mp4", MIB).await;
        let uploader = MockUploader::succeeding("https://host/x");

        pipeline(&root, &chat, &extractor, &uploader, 50 * MIB)
            .run(request())
            .await;

        let mut entries = tokio::fs::read_dir(root.path()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_acquisition_failure_reports_and_cleans_up() {
        let root = TempDir::new().unwrap();
        let chat = MockChat::new();
        let extractor = MockExtractor::new();
        extractor.fail_acquire("unsupported URL").await;
        let uploader = MockUploader::succeeding("https://host/x");

        let outcome = pipeline(&root, &chat, &extractor, &uploader, 50 * MIB)
            .run(request())
            .await;

        assert!(matches!(outcome, DeliveryOutcome::Failed { .. }));
        let text = chat.last_status_text().await.unwrap();
        assert!(text.starts_with("Failed: "));
        assert!(text.contains("unsupported URL"));

        let mut entries = tokio::fs::read_dir(root.path()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_acquisition_is_a_failure() {
        let root = TempDir::new().unwrap();
        let chat = MockChat::new();
        // Acquisition succeeds but writes nothing.
        let extractor = MockExtractor::new();
        let uploader = MockUploader::succeeding("https://host/x");

        let outcome = pipeline(&root, &chat, &extractor, &uploader, 50 * MIB)
            .run(request())
            .await;

        match outcome {
            DeliveryOutcome::Failed { reason } => {
                assert!(reason.contains("no files"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_oversize_artifact_goes_remote() {
        let root = TempDir::new().unwrap();
        let chat = MockChat::new();
        let extractor = MockExtractor::new();
        extractor.add_produced_file("clip.mp4", 80 * MIB).await;
        let uploader = MockUploader::succeeding("https://host/big");

        let outcome = pipeline(&root, &chat, &extractor, &uploader, 50 * MIB)
            .run(request())
            .await;

        assert_eq!(
            outcome,
            DeliveryOutcome::DeliveredViaRemote {
                url: "https://host/big".to_string()
            }
        );
        assert!(chat.media_sends().await.is_empty());
        assert_eq!(
            chat.last_status_text().await.as_deref(),
            Some("Uploaded:\nhttps://host/big")
        );
    }

    #[tokio::test]
    async fn test_selection_reaches_extractor() {
        let root = TempDir::new().unwrap();
        let chat = MockChat::new();
        let extractor = MockExtractor::new();
        extractor.add_produced_file("track.mp3", MIB).await;
        let uploader = MockUploader::succeeding("https://host/x");

        let mut req = request();
        req.selection = FormatSelection::AudioTranscode;
        pipeline(&root, &chat, &extractor, &uploader, 50 * MIB)
            .run(req)
            .await;

        let requests = extractor.acquire_requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].selection, FormatSelection::AudioTranscode);
        assert_eq!(requests[0].source_url, "https://example.com/v");
    }

    #[test]
    fn test_reason_truncation() {
        assert_eq!(truncate_reason("short"), "short");
        let long = "x".repeat(900);
        let truncated = truncate_reason(&long);
        assert_eq!(truncated.chars().count(), MAX_REASON_CHARS + 3);
        assert!(truncated.ends_with("..."));
    }
}

//! Trait definitions for the extractor module.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::progress::ProgressEvent;

use super::error::{AcquisitionError, ProbeError};
use super::types::{AcquisitionRequest, ProbeInfo};

/// A media extractor that can probe a source URL and download from it.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Returns the name of this extractor implementation.
    fn name(&self) -> &str;

    /// Probes a source URL without downloading anything.
    async fn probe(&self, url: &str) -> Result<ProbeInfo, ProbeError>;

    /// Downloads the selected format into the request's working directory.
    ///
    /// Long-running. Progress samples are pushed into `progress_tx`; when the
    /// channel is full the sample is dropped rather than blocking the
    /// download. A terminal `Finished` or `Error` event is pushed before
    /// returning. The implementation never removes the working directory;
    /// cleanup belongs to the pipeline that owns it.
    async fn acquire(
        &self,
        request: AcquisitionRequest,
        progress_tx: mpsc::Sender<ProgressEvent>,
    ) -> Result<(), AcquisitionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{FormatDescriptor, FormatSelection};
    use std::path::PathBuf;

    struct StaticExtractor;

    #[async_trait]
    impl MediaExtractor for StaticExtractor {
        fn name(&self) -> &str {
            "static"
        }

        async fn probe(&self, _url: &str) -> Result<ProbeInfo, ProbeError> {
            Ok(ProbeInfo {
                title: "clip".to_string(),
                thumbnail: None,
                formats: vec![FormatDescriptor::new("22").with_height(720)],
            })
        }

        async fn acquire(
            &self,
            _request: AcquisitionRequest,
            progress_tx: mpsc::Sender<ProgressEvent>,
        ) -> Result<(), AcquisitionError> {
            let _ = progress_tx.send(ProgressEvent::finished()).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_probe_returns_formats() {
        let extractor = StaticExtractor;
        let info = extractor.probe("https://example.com/v").await.unwrap();
        assert_eq!(info.title, "clip");
        assert_eq!(info.formats.len(), 1);
    }

    #[tokio::test]
    async fn test_acquire_emits_terminal_event() {
        let extractor = StaticExtractor;
        let (tx, mut rx) = mpsc::channel(8);
        let request = AcquisitionRequest {
            source_url: "https://example.com/v".to_string(),
            selection: FormatSelection::Format("22".to_string()),
            work_dir: PathBuf::from("/tmp/unused"),
        };
        extractor.acquire(request, tx).await.unwrap();
        let event = rx.recv().await.unwrap();
        assert!(event.phase.is_terminal());
    }
}

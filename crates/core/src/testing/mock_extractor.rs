//! Mock media extractor for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::extractor::{
    AcquisitionError, AcquisitionRequest, MediaExtractor, ProbeError, ProbeInfo,
};
use crate::progress::ProgressEvent;

#[derive(Default)]
struct MockExtractorState {
    probe: Option<ProbeInfo>,
    probe_error: Option<String>,
    produced_files: Vec<(String, u64)>,
    events: Vec<ProgressEvent>,
    acquire_error: Option<String>,
    acquire_requests: Vec<AcquisitionRequest>,
}

/// Mock implementation of the MediaExtractor trait.
///
/// Provides controllable behavior for testing:
/// - Script the probe response or a probe failure
/// - Script the files an acquisition leaves in the working directory
/// - Script progress events and acquisition failures
/// - Track acquisition requests for assertions
///
/// Produced files are written sparse (created and sized, never filled), so
/// multi-gigabyte scenarios cost nothing.
#[derive(Clone, Default)]
pub struct MockExtractor {
    state: Arc<RwLock<MockExtractorState>>,
}

impl MockExtractor {
    /// Create a new mock extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the probe response.
    pub async fn set_probe(&self, info: ProbeInfo) {
        self.state.write().await.probe = Some(info);
    }

    /// Make every probe fail with the given reason.
    pub async fn fail_probe(&self, reason: &str) {
        self.state.write().await.probe_error = Some(reason.to_string());
    }

    /// Add a file the next acquisition will leave in its working directory.
    pub async fn add_produced_file(&self, name: &str, size_bytes: u64) {
        self.state
            .write()
            .await
            .produced_files
            .push((name.to_string(), size_bytes));
    }

    /// Add a progress event the next acquisition will emit.
    pub async fn add_event(&self, event: ProgressEvent) {
        self.state.write().await.events.push(event);
    }

    /// Make every acquisition fail with the given reason.
    pub async fn fail_acquire(&self, reason: &str) {
        self.state.write().await.acquire_error = Some(reason.to_string());
    }

    /// Get all recorded acquisition requests.
    pub async fn acquire_requests(&self) -> Vec<AcquisitionRequest> {
        self.state.read().await.acquire_requests.clone()
    }
}

#[async_trait]
impl MediaExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, _url: &str) -> Result<ProbeInfo, ProbeError> {
        let state = self.state.read().await;
        if let Some(reason) = &state.probe_error {
            return Err(ProbeError::failed(reason.clone()));
        }
        match &state.probe {
            Some(info) => Ok(info.clone()),
            None => Err(ProbeError::failed("no probe scripted")),
        }
    }

    async fn acquire(
        &self,
        request: AcquisitionRequest,
        progress_tx: mpsc::Sender<ProgressEvent>,
    ) -> Result<(), AcquisitionError> {
        let (files, events, error) = {
            let mut state = self.state.write().await;
            state.acquire_requests.push(request.clone());
            (
                state.produced_files.clone(),
                state.events.clone(),
                state.acquire_error.clone(),
            )
        };

        for event in events {
            let _ = progress_tx.send(event).await;
        }

        if let Some(reason) = error {
            let _ = progress_tx.send(ProgressEvent::error()).await;
            return Err(AcquisitionError::failed(reason));
        }

        for (name, size) in files {
            let file = tokio::fs::File::create(request.work_dir.join(&name))
                .await
                .map_err(AcquisitionError::Spawn)?;
            file.set_len(size).await.map_err(AcquisitionError::Spawn)?;
        }

        let _ = progress_tx.send(ProgressEvent::finished()).await;
        Ok(())
    }
}

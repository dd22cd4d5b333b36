//! Delivery router implementation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::artifact::{Artifact, MediaKind};
use crate::chat::{ChatApi, ChatError, ChatId};
use crate::config::UploadConfig;
use crate::progress::{human_size, ProgressReporter};
use crate::uploader::{create_uploader, RemoteUploader};

use super::error::DeliveryError;
use super::types::DeliveryOutcome;

/// Routes a finished artifact to the user.
pub struct DeliveryRouter {
    chat: Arc<dyn ChatApi>,
    upload_config: UploadConfig,
    size_ceiling_bytes: u64,
    uploader_override: Option<Arc<dyn RemoteUploader>>,
}

impl DeliveryRouter {
    /// Creates a router with the given direct-delivery ceiling in bytes.
    pub fn new(chat: Arc<dyn ChatApi>, upload_config: UploadConfig, size_ceiling_bytes: u64) -> Self {
        Self {
            chat,
            upload_config,
            size_ceiling_bytes,
            uploader_override: None,
        }
    }

    /// Replaces the config-driven uploader with a fixed one (tests).
    pub fn with_uploader(mut self, uploader: Arc<dyn RemoteUploader>) -> Self {
        self.uploader_override = Some(uploader);
        self
    }

    /// Delivers the artifact, ending in exactly one [`DeliveryOutcome`].
    ///
    /// At or under the ceiling: direct hand-off, with exactly one automatic
    /// fallback to remote upload on any direct failure. Over the ceiling:
    /// remote upload only. A failed remote upload is terminal either way.
    pub async fn deliver(
        &self,
        chat: ChatId,
        artifact: &Artifact,
        reporter: &ProgressReporter,
    ) -> DeliveryOutcome {
        if artifact.size_bytes <= self.size_ceiling_bytes {
            match self.send_direct(chat, artifact).await {
                Ok(()) => {
                    info!("Delivered {} directly", artifact.file_name());
                    return DeliveryOutcome::Delivered;
                }
                Err(e) => {
                    warn!("Direct hand-off failed, falling back to remote upload: {}", e);
                    reporter
                        .set_text(&format!(
                            "Sending failed: {}\nUploading to remote host instead...",
                            e
                        ))
                        .await;
                }
            }
        } else {
            reporter
                .set_text(&format!(
                    "File is large ({}). Uploading to remote host...",
                    human_size(artifact.size_bytes)
                ))
                .await;
        }

        match self.upload_remote(artifact, reporter).await {
            Ok(url) => DeliveryOutcome::DeliveredViaRemote { url },
            Err(e) => DeliveryOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }

    /// Hands the artifact bytes to the chat platform, picking the attachment
    /// kind from the artifact's media kind.
    async fn send_direct(&self, chat: ChatId, artifact: &Artifact) -> Result<(), ChatError> {
        let caption = artifact.file_name();
        match artifact.kind {
            MediaKind::Video => self.chat.send_video(chat, &artifact.path, &caption).await?,
            MediaKind::Audio => self.chat.send_audio(chat, &artifact.path, &caption).await?,
            MediaKind::Other => self.chat.send_document(chat, &artifact.path, &caption).await?,
        };
        Ok(())
    }

    async fn upload_remote(
        &self,
        artifact: &Artifact,
        reporter: &ProgressReporter,
    ) -> Result<String, DeliveryError> {
        let uploader = match &self.uploader_override {
            Some(uploader) => Arc::clone(uploader),
            None => Arc::from(create_uploader(&self.upload_config)?),
        };
        info!(
            "Uploading {} ({}) via {}",
            artifact.file_name(),
            human_size(artifact.size_bytes),
            uploader.name()
        );
        Ok(uploader.upload(&artifact.path, reporter).await?)
    }
}

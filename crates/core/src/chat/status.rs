//! Per-request status message.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::progress::StatusSink;

use super::error::ChatError;
use super::traits::ChatApi;
use super::types::{ChatId, MessageRef};

/// The single mutable status line of one pipeline instance.
///
/// Wraps one chat message whose text is replaced over and over. When the
/// message disappears mid-transfer (a user deleted it), the next replacement
/// sends a fresh message and continues editing that one.
pub struct StatusMessage {
    api: Arc<dyn ChatApi>,
    chat: ChatId,
    current: Mutex<Option<MessageRef>>,
}

impl StatusMessage {
    /// Wraps an already-sent message.
    pub fn new(api: Arc<dyn ChatApi>, message: MessageRef) -> Self {
        Self {
            api,
            chat: message.chat,
            current: Mutex::new(Some(message)),
        }
    }

    /// Sends the initial status text and wraps the resulting message.
    pub async fn send(
        api: Arc<dyn ChatApi>,
        chat: ChatId,
        initial_text: &str,
    ) -> Result<Self, ChatError> {
        let message = api.send_text(chat, initial_text, None).await?;
        Ok(Self::new(api, message))
    }

    /// The chat this status belongs to.
    pub fn chat(&self) -> ChatId {
        self.chat
    }
}

#[async_trait]
impl StatusSink for StatusMessage {
    async fn replace_text(&self, text: &str) -> anyhow::Result<()> {
        let mut current = self.current.lock().await;
        match *current {
            Some(message) => match self.api.edit_text(message, text, None).await {
                Ok(()) => Ok(()),
                Err(ChatError::MessageMissing) => {
                    debug!("Status message gone, sending a new one");
                    let fresh = self.api.send_text(self.chat, text, None).await?;
                    *current = Some(fresh);
                    Ok(())
                }
                Err(e) => Err(e.into()),
            },
            None => {
                let fresh = self.api.send_text(self.chat, text, None).await?;
                *current = Some(fresh);
                Ok(())
            }
        }
    }
}

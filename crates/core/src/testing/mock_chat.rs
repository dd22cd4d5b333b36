//! Mock chat platform for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::chat::{ChatApi, ChatError, ChatId, InlineKeyboard, MessageRef};

/// A recorded media send for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedMedia {
    /// Which trait method was called ("send_video", "send_audio", "send_document").
    pub method: &'static str,
    /// Chat the attachment went to.
    pub chat: ChatId,
    /// Local path handed over.
    pub path: PathBuf,
    /// Attached caption.
    pub caption: String,
}

/// A recorded photo-by-URL send.
#[derive(Debug, Clone)]
pub struct RecordedPhoto {
    pub chat: ChatId,
    pub photo_url: String,
    pub caption: String,
    pub keyboard: Option<InlineKeyboard>,
}

#[derive(Default)]
struct MockChatState {
    next_message_id: i64,
    sent_texts: Vec<String>,
    last_status_text: Option<String>,
    last_keyboard: Option<InlineKeyboard>,
    edits_missing: bool,
    media_fail: Option<String>,
    media_sends: Vec<RecordedMedia>,
    photo_sends: Vec<RecordedPhoto>,
    answered_callbacks: Vec<String>,
    deleted: Vec<MessageRef>,
}

/// Mock implementation of the ChatApi trait.
///
/// Provides controllable behavior for testing:
/// - Track sent messages and attachments for assertions
/// - Simulate a deleted status message
/// - Simulate payload rejections
#[derive(Clone, Default)]
pub struct MockChat {
    state: Arc<RwLock<MockChatState>>,
}

impl MockChat {
    /// Create a new mock chat.
    pub fn new() -> Self {
        Self::default()
    }

    /// All texts sent as fresh messages, in order. Edits are not included.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.state.read().await.sent_texts.clone()
    }

    /// The most recent text shown to the user, whether sent or edited in.
    pub async fn last_status_text(&self) -> Option<String> {
        self.state.read().await.last_status_text.clone()
    }

    /// The keyboard attached to the most recent send or edit.
    pub async fn last_keyboard(&self) -> Option<InlineKeyboard> {
        self.state.read().await.last_keyboard.clone()
    }

    /// All successful media sends, in order.
    pub async fn media_sends(&self) -> Vec<RecordedMedia> {
        self.state.read().await.media_sends.clone()
    }

    /// All photo-by-URL sends, in order.
    pub async fn photo_sends(&self) -> Vec<RecordedPhoto> {
        self.state.read().await.photo_sends.clone()
    }

    /// Callback identifiers acknowledged so far.
    pub async fn answered_callbacks(&self) -> Vec<String> {
        self.state.read().await.answered_callbacks.clone()
    }

    /// Messages deleted so far.
    pub async fn deleted_messages(&self) -> Vec<MessageRef> {
        self.state.read().await.deleted.clone()
    }

    /// Make every subsequent edit fail as if the message was deleted.
    pub async fn set_edits_missing(&self, missing: bool) {
        self.state.write().await.edits_missing = missing;
    }

    /// Make every subsequent media send fail with a payload rejection.
    pub async fn fail_media_sends(&self, reason: &str) {
        self.state.write().await.media_fail = Some(reason.to_string());
    }

    async fn next_message(&self, chat: ChatId) -> MessageRef {
        let mut state = self.state.write().await;
        state.next_message_id += 1;
        MessageRef {
            chat,
            message_id: state.next_message_id,
        }
    }
}

#[async_trait]
impl ChatApi for MockChat {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef, ChatError> {
        let mut state = self.state.write().await;
        state.next_message_id += 1;
        state.sent_texts.push(text.to_string());
        state.last_status_text = Some(text.to_string());
        state.last_keyboard = keyboard.cloned();
        Ok(MessageRef {
            chat,
            message_id: state.next_message_id,
        })
    }

    async fn edit_text(
        &self,
        _message: MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), ChatError> {
        let mut state = self.state.write().await;
        if state.edits_missing {
            return Err(ChatError::MessageMissing);
        }
        state.last_status_text = Some(text.to_string());
        state.last_keyboard = keyboard.cloned();
        Ok(())
    }

    async fn send_photo_url(
        &self,
        chat: ChatId,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef, ChatError> {
        let message = self.next_message(chat).await;
        self.state.write().await.photo_sends.push(RecordedPhoto {
            chat,
            photo_url: photo_url.to_string(),
            caption: caption.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(message)
    }

    async fn send_video(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<MessageRef, ChatError> {
        self.record_media("send_video", chat, path, caption).await
    }

    async fn send_audio(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<MessageRef, ChatError> {
        self.record_media("send_audio", chat, path, caption).await
    }

    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<MessageRef, ChatError> {
        self.record_media("send_document", chat, path, caption).await
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), ChatError> {
        self.state
            .write()
            .await
            .answered_callbacks
            .push(callback_id.to_string());
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), ChatError> {
        self.state.write().await.deleted.push(message);
        Ok(())
    }
}

impl MockChat {
    async fn record_media(
        &self,
        method: &'static str,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<MessageRef, ChatError> {
        let mut state = self.state.write().await;
        if let Some(reason) = &state.media_fail {
            return Err(ChatError::rejected(reason.clone()));
        }
        state.next_message_id += 1;
        state.media_sends.push(RecordedMedia {
            method,
            chat,
            path: path.to_path_buf(),
            caption: caption.to_string(),
        });
        Ok(MessageRef {
            chat,
            message_id: state.next_message_id,
        })
    }
}

//! Trait definitions for the chat module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ChatError;
use super::types::{ChatId, InlineKeyboard, MessageRef};

/// The chat platform as the pipeline sees it.
///
/// File-sending methods stream the file from disk; implementations must not
/// buffer the whole attachment in memory.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Sends a text message, optionally with an inline keyboard.
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef, ChatError>;

    /// Replaces the text (and keyboard) of an existing message.
    ///
    /// Fails with [`ChatError::MessageMissing`] when the message was deleted.
    async fn edit_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), ChatError>;

    /// Sends a photo by URL with a caption.
    async fn send_photo_url(
        &self,
        chat: ChatId,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef, ChatError>;

    /// Sends a local file as a video attachment.
    async fn send_video(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<MessageRef, ChatError>;

    /// Sends a local file as an audio attachment.
    async fn send_audio(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<MessageRef, ChatError>;

    /// Sends a local file as a generic document.
    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<MessageRef, ChatError>;

    /// Acknowledges a keyboard selection.
    async fn answer_callback(&self, callback_id: &str) -> Result<(), ChatError>;

    /// Deletes a message. Best-effort; used to drop superseded prompts.
    async fn delete_message(&self, message: MessageRef) -> Result<(), ChatError>;
}

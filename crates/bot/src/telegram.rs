//! Telegram Bot API adapter.
//!
//! Implements the core [`ChatApi`] seam over the HTTP Bot API. Attachments
//! are streamed from disk through multipart parts; nothing is buffered
//! whole. Platform quirks (deleted status messages, unchanged edits,
//! oversize payloads) are mapped to the core error variants right here.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use fetchbot_core::chat::{ChatApi, ChatError, ChatId, InlineKeyboard, MessageRef};
use fetchbot_core::uploader::file_stream;

use crate::updates::{Chat, Update};

/// Timeout for plain API calls; must exceed the long-poll window.
const API_TIMEOUT: Duration = Duration::from_secs(90);

/// Timeout for attachment uploads.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60 * 60);

pub struct TelegramClient {
    api: Client,
    upload: Client,
    base: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    message_id: i64,
    chat: Chat,
}

impl From<RawMessage> for MessageRef {
    fn from(raw: RawMessage) -> Self {
        Self {
            chat: ChatId(raw.chat.id),
            message_id: raw.message_id,
        }
    }
}

impl TelegramClient {
    /// Creates a client for the given bot token.
    pub fn new(token: &str) -> Result<Self, ChatError> {
        let api = Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|e| ChatError::Network(e.to_string()))?;
        let upload = Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .map_err(|e| ChatError::Network(e.to_string()))?;
        Ok(Self {
            api,
            upload,
            base: format!("https://api.telegram.org/bot{}", token),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<T, ChatError> {
        let response = self
            .api
            .post(self.url(method))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        read_response(response).await
    }

    /// Polls for updates, blocking server-side up to `timeout_secs`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Update>, ChatError> {
        let mut payload = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(offset) = offset {
            payload["offset"] = json!(offset);
        }
        self.call("getUpdates", payload).await
    }

    async fn send_file(
        &self,
        method: &str,
        field: &str,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<MessageRef, ChatError> {
        let size = tokio::fs::metadata(path)
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?
            .len();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        debug!("{} {:?} ({} bytes) to chat {}", method, path, size, chat.0);
        let part = Part::stream_with_length(Body::wrap_stream(file_stream(file, None)), size)
            .file_name(filename);
        let form = Form::new()
            .text("chat_id", chat.0.to_string())
            .text("caption", caption.to_string())
            .part(field.to_string(), part);

        let response = self
            .upload
            .post(self.url(method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        let raw: RawMessage = read_response(response).await?;
        Ok(raw.into())
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ChatError> {
    let status = response.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return Err(ChatError::rejected("Request Entity Too Large"));
    }
    let body: ApiResponse<T> = response
        .json()
        .await
        .map_err(|e| ChatError::Network(e.to_string()))?;
    if body.ok {
        body.result
            .ok_or_else(|| ChatError::api("response carried no result"))
    } else {
        Err(map_api_error(status, body.description))
    }
}

/// Maps a Bot API rejection onto the core error variants.
fn map_api_error(status: StatusCode, description: Option<String>) -> ChatError {
    let description = description.unwrap_or_else(|| format!("HTTP {}", status));
    let lowered = description.to_lowercase();
    if lowered.contains("message to edit not found")
        || lowered.contains("message can't be edited")
    {
        ChatError::MessageMissing
    } else if status == StatusCode::PAYLOAD_TOO_LARGE
        || lowered.contains("request entity too large")
    {
        ChatError::rejected(description)
    } else {
        ChatError::api(description)
    }
}

fn keyboard_markup(keyboard: &InlineKeyboard) -> serde_json::Value {
    json!({
        "inline_keyboard": keyboard
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| json!({"text": b.text, "callback_data": b.callback_data}))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>(),
    })
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef, ChatError> {
        let mut payload = json!({"chat_id": chat.0, "text": text});
        if let Some(keyboard) = keyboard {
            payload["reply_markup"] = keyboard_markup(keyboard);
        }
        let raw: RawMessage = self.call("sendMessage", payload).await?;
        Ok(raw.into())
    }

    async fn edit_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), ChatError> {
        let mut payload = json!({
            "chat_id": message.chat.0,
            "message_id": message.message_id,
            "text": text,
        });
        if let Some(keyboard) = keyboard {
            payload["reply_markup"] = keyboard_markup(keyboard);
        }
        match self
            .call::<serde_json::Value>("editMessageText", payload)
            .await
        {
            Ok(_) => Ok(()),
            // Same text as before; the display already matches.
            Err(ChatError::Api { reason }) if reason.to_lowercase().contains("not modified") => {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn send_photo_url(
        &self,
        chat: ChatId,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef, ChatError> {
        let mut payload = json!({
            "chat_id": chat.0,
            "photo": photo_url,
            "caption": caption,
        });
        if let Some(keyboard) = keyboard {
            payload["reply_markup"] = keyboard_markup(keyboard);
        }
        let raw: RawMessage = self.call("sendPhoto", payload).await?;
        Ok(raw.into())
    }

    async fn send_video(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<MessageRef, ChatError> {
        self.send_file("sendVideo", "video", chat, path, caption).await
    }

    async fn send_audio(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<MessageRef, ChatError> {
        self.send_file("sendAudio", "audio", chat, path, caption).await
    }

    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<MessageRef, ChatError> {
        self.send_file("sendDocument", "document", chat, path, caption)
            .await
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), ChatError> {
        self.call::<serde_json::Value>(
            "answerCallbackQuery",
            json!({"callback_query_id": callback_id}),
        )
        .await?;
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), ChatError> {
        self.call::<serde_json::Value>(
            "deleteMessage",
            json!({"chat_id": message.chat.0, "message_id": message.message_id}),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_missing_message() {
        let err = map_api_error(
            StatusCode::BAD_REQUEST,
            Some("Bad Request: message to edit not found".to_string()),
        );
        assert!(matches!(err, ChatError::MessageMissing));
    }

    #[test]
    fn test_map_oversize_payload() {
        let err = map_api_error(
            StatusCode::PAYLOAD_TOO_LARGE,
            Some("Request Entity Too Large".to_string()),
        );
        assert!(matches!(err, ChatError::PayloadRejected { .. }));

        let err = map_api_error(
            StatusCode::BAD_REQUEST,
            Some("Bad Request: Request Entity Too Large".to_string()),
        );
        assert!(matches!(err, ChatError::PayloadRejected { .. }));
    }

    #[test]
    fn test_map_other_errors() {
        let err = map_api_error(StatusCode::FORBIDDEN, Some("bot was blocked".to_string()));
        assert!(matches!(err, ChatError::Api { .. }));

        let err = map_api_error(StatusCode::INTERNAL_SERVER_ERROR, None);
        assert!(matches!(err, ChatError::Api { reason } if reason.contains("500")));
    }

    #[test]
    fn test_keyboard_markup_shape() {
        let keyboard = InlineKeyboard::new()
            .button("720p", "t:22")
            .button("Audio (MP3)", "t:audio:mp3");
        let markup = keyboard_markup(&keyboard);
        assert_eq!(markup["inline_keyboard"][0][0]["text"], "720p");
        assert_eq!(markup["inline_keyboard"][1][0]["callback_data"], "t:audio:mp3");
    }
}

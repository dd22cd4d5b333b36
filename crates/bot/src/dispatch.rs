//! Update dispatch: turns incoming messages and keyboard selections into
//! pipeline runs.

use std::sync::Arc;

use tracing::{debug, warn};

use fetchbot_core::catalog::{build_catalog, CatalogCache};
use fetchbot_core::chat::{ChatApi, ChatId, InlineKeyboard};
use fetchbot_core::extractor::MediaExtractor;
use fetchbot_core::pipeline::{Pipeline, PipelineRequest};

use crate::updates::Update;

const HELP_TEXT: &str = "Send me a media URL and I will list the available \
formats. Pick one and I will fetch and deliver it here.";

const INVALID_URL_TEXT: &str = "Please send a valid http/https URL.";

const EXPIRED_TEXT: &str = "That selection has expired. Please send the URL again.";

pub struct Dispatcher {
    chat: Arc<dyn ChatApi>,
    extractor: Arc<dyn MediaExtractor>,
    pipeline: Arc<Pipeline>,
    cache: Arc<CatalogCache>,
}

impl Dispatcher {
    pub fn new(
        chat: Arc<dyn ChatApi>,
        extractor: Arc<dyn MediaExtractor>,
        pipeline: Arc<Pipeline>,
        cache: Arc<CatalogCache>,
    ) -> Self {
        Self {
            chat,
            extractor,
            pipeline,
            cache,
        }
    }

    /// Handles one long-poll update to completion.
    pub async fn handle_update(&self, update: Update) {
        if let Some(message) = update.message {
            if let Some(text) = message.text {
                self.handle_message(ChatId(message.chat.id), text.trim()).await;
            }
            return;
        }
        if let Some(query) = update.callback_query {
            self.handle_callback(&query.id, query.data.as_deref(), query.message.map(|m| ChatId(m.chat.id)))
                .await;
        }
    }

    /// Handles a text message: commands, then URL probing.
    async fn handle_message(&self, chat: ChatId, text: &str) {
        if text == "/start" || text == "/help" {
            self.send_plain(chat, HELP_TEXT).await;
            return;
        }

        if !text.starts_with("http://") && !text.starts_with("https://") {
            self.send_plain(chat, INVALID_URL_TEXT).await;
            return;
        }

        let info_message = match self.chat.send_text(chat, "Fetching media info...", None).await {
            Ok(message) => message,
            Err(e) => {
                warn!("Cannot reply in chat {}: {}", chat.0, e);
                return;
            }
        };

        let probe = match self.extractor.probe(text).await {
            Ok(probe) => probe,
            Err(e) => {
                debug!("Probe of {} failed: {}", text, e);
                let _ = self
                    .chat
                    .edit_text(info_message, &format!("Failed: {}", e), None)
                    .await;
                return;
            }
        };

        let catalog = build_catalog(&probe.formats);
        let token = self.cache.insert(text, catalog.clone());
        let mut keyboard = InlineKeyboard::new();
        for entry in catalog.entries() {
            keyboard = keyboard.button(&entry.label, format!("{}:{}", token, entry.id));
        }

        // Prefer a thumbnail card; fall back to editing the probe notice.
        if let Some(thumbnail) = &probe.thumbnail {
            match self
                .chat
                .send_photo_url(chat, thumbnail, &probe.title, Some(&keyboard))
                .await
            {
                Ok(_) => {
                    let _ = self.chat.delete_message(info_message).await;
                    return;
                }
                Err(e) => debug!("Thumbnail send failed, editing text instead: {}", e),
            }
        }
        let _ = self
            .chat
            .edit_text(info_message, &probe.title, Some(&keyboard))
            .await;
    }

    /// Handles a keyboard selection: resolves the cached catalog and runs
    /// the pipeline to completion.
    async fn handle_callback(&self, callback_id: &str, data: Option<&str>, chat: Option<ChatId>) {
        if let Err(e) = self.chat.answer_callback(callback_id).await {
            debug!("Failed to answer callback {}: {}", callback_id, e);
        }
        let Some(chat) = chat else {
            warn!("Callback {} carries no originating message", callback_id);
            return;
        };
        let Some((token, entry_id)) = data.and_then(|d| d.split_once(':')) else {
            self.send_plain(chat, EXPIRED_TEXT).await;
            return;
        };

        let Some(cached) = self.cache.resolve(token) else {
            self.send_plain(chat, EXPIRED_TEXT).await;
            return;
        };
        let Some(selection) = cached.catalog.selection_for(entry_id) else {
            self.send_plain(chat, EXPIRED_TEXT).await;
            return;
        };

        self.pipeline
            .run(PipelineRequest {
                chat,
                source_url: cached.source_url,
                selection,
            })
            .await;
    }

    async fn send_plain(&self, chat: ChatId, text: &str) {
        if let Err(e) = self.chat.send_text(chat, text, None).await {
            warn!("Cannot reply in chat {}: {}", chat.0, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updates::{CallbackQuery, Chat, IncomingMessage};
    use fetchbot_core::catalog::AUDIO_ENTRY_ID;
    use fetchbot_core::config::UploadConfig;
    use fetchbot_core::delivery::DeliveryRouter;
    use fetchbot_core::extractor::{FormatDescriptor, FormatSelection, ProbeInfo};
    use fetchbot_core::testing::{MockChat, MockExtractor, MockUploader};
    use std::time::Duration;
    use tempfile::TempDir;

    struct TestBot {
        _root: TempDir,
        chat: MockChat,
        extractor: MockExtractor,
        dispatcher: Dispatcher,
    }

    fn bot() -> TestBot {
        let root = TempDir::new().unwrap();
        let chat = MockChat::new();
        let extractor = MockExtractor::new();
        let router = DeliveryRouter::new(
            Arc::new(chat.clone()),
            UploadConfig::default(),
            50 * 1024 * 1024,
        )
        .with_uploader(Arc::new(MockUploader::succeeding("https://host/x")));
        let pipeline = Pipeline::new(
            Arc::new(extractor.clone()),
            Arc::new(chat.clone()),
            router,
            root.path().to_path_buf(),
        )
        .with_progress_interval(Duration::from_millis(0));
        let dispatcher = Dispatcher::new(
            Arc::new(chat.clone()),
            Arc::new(extractor.clone()),
            Arc::new(pipeline),
            Arc::new(CatalogCache::default()),
        );
        TestBot {
            _root: root,
            chat,
            extractor,
            dispatcher,
        }
    }

    fn message_update(text: &str) -> Update {
        Update {
            update_id: 1,
            message: Some(IncomingMessage {
                message_id: 1,
                chat: Chat { id: 42 },
                text: Some(text.to_string()),
            }),
            callback_query: None,
        }
    }

    fn callback_update(data: &str) -> Update {
        Update {
            update_id: 2,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "cb1".to_string(),
                data: Some(data.to_string()),
                message: Some(IncomingMessage {
                    message_id: 5,
                    chat: Chat { id: 42 },
                    text: None,
                }),
            }),
        }
    }

    fn probe_info(thumbnail: Option<&str>) -> ProbeInfo {
        ProbeInfo {
            title: "A clip".to_string(),
            thumbnail: thumbnail.map(str::to_string),
            formats: vec![
                FormatDescriptor::new("22").with_height(720).with_ext("mp4"),
                FormatDescriptor::new("18").with_height(360).with_ext("mp4"),
            ],
        }
    }

    #[tokio::test]
    async fn test_help_command() {
        let bot = bot();
        bot.dispatcher.handle_update(message_update("/help")).await;
        assert_eq!(bot.chat.last_status_text().await.as_deref(), Some(HELP_TEXT));
    }

    #[tokio::test]
    async fn test_non_url_is_rejected() {
        let bot = bot();
        bot.dispatcher.handle_update(message_update("hello there")).await;
        assert_eq!(
            bot.chat.last_status_text().await.as_deref(),
            Some(INVALID_URL_TEXT)
        );
    }

    #[tokio::test]
    async fn test_url_with_thumbnail_sends_photo_card() {
        let bot = bot();
        bot.extractor
            .set_probe(probe_info(Some("https://cdn.example.com/thumb.jpg")))
            .await;

        bot.dispatcher
            .handle_update(message_update("https://example.com/v"))
            .await;

        let photos = bot.chat.photo_sends().await;
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].photo_url, "https://cdn.example.com/thumb.jpg");
        assert_eq!(photos[0].caption, "A clip");
        // Two real formats plus the synthetic audio entry.
        let keyboard = photos[0].keyboard.as_ref().unwrap();
        assert_eq!(keyboard.len(), 3);
        // The probe notice is superseded by the card.
        assert_eq!(bot.chat.deleted_messages().await.len(), 1);
    }

    #[tokio::test]
    async fn test_url_without_thumbnail_edits_notice() {
        let bot = bot();
        bot.extractor.set_probe(probe_info(None)).await;

        bot.dispatcher
            .handle_update(message_update("https://example.com/v"))
            .await;

        assert!(bot.chat.photo_sends().await.is_empty());
        assert_eq!(bot.chat.last_status_text().await.as_deref(), Some("A clip"));
        assert_eq!(bot.chat.last_keyboard().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_probe_failure_is_reported() {
        let bot = bot();
        bot.extractor.fail_probe("Unsupported URL").await;

        bot.dispatcher
            .handle_update(message_update("https://example.com/v"))
            .await;

        let text = bot.chat.last_status_text().await.unwrap();
        assert!(text.starts_with("Failed: "));
        assert!(text.contains("Unsupported URL"));
    }

    #[tokio::test]
    async fn test_selection_runs_pipeline() {
        let bot = bot();
        bot.extractor.set_probe(probe_info(None)).await;
        bot.extractor.add_produced_file("clip.mp4", 1024).await;

        bot.dispatcher
            .handle_update(message_update("https://example.com/v"))
            .await;
        let keyboard = bot.chat.last_keyboard().await.unwrap();
        let payload = keyboard.rows[0][0].callback_data.clone();

        bot.dispatcher.handle_update(callback_update(&payload)).await;

        assert_eq!(bot.chat.answered_callbacks().await, vec!["cb1"]);
        let requests = bot.extractor.acquire_requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].source_url, "https://example.com/v");
        assert_eq!(
            requests[0].selection,
            FormatSelection::Format("22".to_string())
        );
        assert_eq!(bot.chat.media_sends().await.len(), 1);
    }

    #[tokio::test]
    async fn test_audio_entry_id_survives_payload_split() {
        let bot = bot();
        bot.extractor.set_probe(probe_info(None)).await;
        bot.extractor.add_produced_file("track.mp3", 1024).await;

        bot.dispatcher
            .handle_update(message_update("https://example.com/v"))
            .await;
        let keyboard = bot.chat.last_keyboard().await.unwrap();
        // Last row is the synthetic audio entry; its id itself contains a
        // colon, which the token split must not break.
        let payload = keyboard.rows.last().unwrap()[0].callback_data.clone();
        assert!(payload.ends_with(AUDIO_ENTRY_ID));

        bot.dispatcher.handle_update(callback_update(&payload)).await;

        let requests = bot.extractor.acquire_requests().await;
        assert_eq!(requests[0].selection, FormatSelection::AudioTranscode);
    }

    #[tokio::test]
    async fn test_unknown_token_expires_politely() {
        let bot = bot();
        bot.dispatcher
            .handle_update(callback_update("stale-token:22"))
            .await;
        assert_eq!(
            bot.chat.last_status_text().await.as_deref(),
            Some(EXPIRED_TEXT)
        );
        assert!(bot.extractor.acquire_requests().await.is_empty());
    }
}

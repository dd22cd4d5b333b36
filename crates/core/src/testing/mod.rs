//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of the external collaborator
//! traits, allowing comprehensive pipeline testing without a chat platform,
//! an extractor binary or a remote host.
//!
//! # Example
//!
//! ```rust,ignore
//! use fetchbot_core::testing::{MockChat, MockExtractor, MockUploader};
//!
//! let chat = MockChat::new();
//! let extractor = MockExtractor::new();
//! extractor.add_produced_file("clip.mp4", 5 * 1024 * 1024).await;
//!
//! // Run the pipeline, then assert on what the user saw.
//! assert_eq!(chat.media_sends().await.len(), 1);
//! ```

mod mock_chat;
mod mock_extractor;
mod mock_uploader;

pub use mock_chat::{MockChat, RecordedMedia, RecordedPhoto};
pub use mock_extractor::MockExtractor;
pub use mock_uploader::MockUploader;

//! Chat-platform collaborator boundary.
//!
//! Everything the pipeline needs from the chat platform is behind the
//! [`ChatApi`] trait: sending and editing text, attaching files by media
//! kind, answering selection callbacks. [`StatusMessage`] layers the
//! per-request status discipline on top: one message whose text is replaced
//! over and over, transparently re-sent if a user deletes it mid-transfer.

mod error;
mod status;
mod traits;
mod types;

pub use error::ChatError;
pub use status::StatusMessage;
pub use traits::ChatApi;
pub use types::{ChatId, InlineButton, InlineKeyboard, MessageRef};

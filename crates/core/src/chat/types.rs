//! Types for the chat module.

use serde::{Deserialize, Serialize};

/// Identity of a chat (a user conversation or a group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// A message that can be edited or deleted later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    /// Chat the message lives in.
    pub chat: ChatId,
    /// Platform message identifier.
    pub message_id: i64,
}

/// One selectable button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    /// Visible label.
    pub text: String,
    /// Opaque payload returned on selection.
    pub callback_data: String,
}

/// An inline keyboard, one button per row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
    /// Button rows.
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// Creates an empty keyboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a full-width button row.
    pub fn button(mut self, text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        self.rows.push(vec![InlineButton {
            text: text.into(),
            callback_data: callback_data.into(),
        }]);
        self
    }

    /// Total number of buttons.
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Whether the keyboard has no buttons.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//! Types for the artifact module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extensions classified as video attachments.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "mov", "webm", "avi"];

/// Extensions classified as audio attachments.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "aac", "ogg"];

/// Attachment kind inferred from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
    /// Anything else is delivered as a generic document.
    Other,
}

impl MediaKind {
    /// Classifies a path by its extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Audio
        } else {
            Self::Other
        }
    }
}

/// The file selected for delivery.
///
/// Owned exclusively by the pipeline instance that produced it; its lifetime
/// ends with the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Absolute path inside the working directory.
    pub path: PathBuf,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Inferred attachment kind.
    pub kind: MediaKind,
}

impl Artifact {
    /// The artifact's file name, used as the delivery caption.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string())
    }
}

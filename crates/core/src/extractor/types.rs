//! Types for the extractor module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One concrete encoding/quality variant of a source media asset.
///
/// Every field except the identifier may independently be absent; "unknown"
/// is a valid value throughout. Immutable once mapped from the probe
/// response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// Format identifier, unique within one probe response.
    pub id: String,
    /// Vertical resolution in pixels.
    pub height: Option<u32>,
    /// Frame rate.
    pub fps: Option<f64>,
    /// Container extension (e.g. "mp4", "webm").
    pub ext: Option<String>,
    /// Total bitrate in kbps.
    pub bitrate_kbps: Option<f64>,
    /// Exact or approximate size in bytes.
    pub size_bytes: Option<u64>,
}

impl FormatDescriptor {
    /// Creates a descriptor with only an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            height: None,
            fps: None,
            ext: None,
            bitrate_kbps: None,
            size_bytes: None,
        }
    }

    /// Sets the height.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Sets the frame rate.
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Sets the container extension.
    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = Some(ext.into());
        self
    }

    /// Sets the bitrate in kbps.
    pub fn with_bitrate(mut self, kbps: f64) -> Self {
        self.bitrate_kbps = Some(kbps);
        self
    }

    /// Sets the size in bytes.
    pub fn with_size(mut self, bytes: u64) -> Self {
        self.size_bytes = Some(bytes);
        self
    }
}

/// Result of a non-downloading probe of a source URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeInfo {
    /// Media title.
    pub title: String,
    /// Thumbnail URL, when the source provides one.
    pub thumbnail: Option<String>,
    /// Available formats, in the order the source listed them.
    pub formats: Vec<FormatDescriptor>,
}

/// The encoding the user picked from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSelection {
    /// A concrete format identifier from the probe response.
    Format(String),
    /// Best available audio stream, transcoded to MP3 at 192 kbps.
    AudioTranscode,
}

/// A single acquisition to run.
///
/// Created at selection time and consumed exactly once; the working
/// directory is exclusive to this request for its whole lifetime.
#[derive(Debug, Clone)]
pub struct AcquisitionRequest {
    /// Source media URL.
    pub source_url: String,
    /// Selected format.
    pub selection: FormatSelection,
    /// Exclusive working directory the output lands in.
    pub work_dir: PathBuf,
}

//! Artifact location: picking the delivered file out of a working directory.
//!
//! Acquisition tools may leave auxiliary files (thumbnails, fragments,
//! metadata) next to the actual output. [`locate_artifact`] deterministically
//! selects the largest regular file as the artifact and classifies its media
//! kind from the extension.

mod locator;
mod types;

pub use locator::{locate_artifact, ArtifactError};
pub use types::{Artifact, MediaKind, AUDIO_EXTENSIONS, VIDEO_EXTENSIONS};

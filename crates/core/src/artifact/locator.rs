//! Artifact locator.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::types::{Artifact, MediaKind};

/// Errors from locating the produced artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The acquisition reported success but the directory holds no files.
    #[error("Acquisition produced no files in {dir}")]
    Empty { dir: PathBuf },

    /// Listing the directory failed.
    #[error("Failed to inspect working directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Selects the delivered artifact from a working directory.
///
/// Lists direct entries only (the extractor never nests its output) and
/// picks the largest regular file; when sizes tie, the first one listed
/// wins.
pub async fn locate_artifact(dir: &Path) -> Result<Artifact, ArtifactError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut best: Option<(PathBuf, u64)> = None;

    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let size = metadata.len();
        let replace = match &best {
            Some((_, best_size)) => size > *best_size,
            None => true,
        };
        if replace {
            best = Some((entry.path(), size));
        }
    }

    let (path, size_bytes) = best.ok_or_else(|| ArtifactError::Empty {
        dir: dir.to_path_buf(),
    })?;
    let kind = MediaKind::from_path(&path);
    debug!("Located artifact {:?} ({} bytes, {:?})", path, size_bytes, kind);

    Ok(Artifact {
        path,
        size_bytes,
        kind,
    })
}

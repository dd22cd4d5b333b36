//! Ephemeral per-request working directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;
use uuid::Uuid;

/// An exclusive working directory for one pipeline instance.
///
/// Never shared between requests; the random name guarantees that. The
/// directory must not outlive its pipeline: call [`WorkDir::cleanup`] on
/// every exit path. `Drop` removes it synchronously as a backstop so a
/// cancelled task cannot leak it either.
pub struct WorkDir {
    path: PathBuf,
    removed: AtomicBool,
}

impl WorkDir {
    /// Creates a fresh directory under `root`.
    pub async fn create(root: &Path) -> std::io::Result<Self> {
        let path = root.join(format!("req-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self {
            path,
            removed: AtomicBool::new(false),
        })
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the directory and everything in it.
    ///
    /// Idempotent: an already-removed directory is a success, and removal
    /// failures are logged rather than propagated; cleanup must never turn
    /// a delivered artifact into a failed request.
    pub async fn cleanup(&self) {
        self.removed.store(true, Ordering::Relaxed);
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove working directory {:?}: {}", self.path, e),
        }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if !self.removed.load(Ordering::Relaxed) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_and_cleanup() {
        let root = TempDir::new().unwrap();
        let workdir = WorkDir::create(root.path()).await.unwrap();
        assert!(workdir.path().is_dir());

        tokio::fs::write(workdir.path().join("artifact.mp4"), b"data")
            .await
            .unwrap();
        workdir.cleanup().await;
        assert!(!workdir.path().exists());
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let root = TempDir::new().unwrap();
        let workdir = WorkDir::create(root.path()).await.unwrap();
        workdir.cleanup().await;
        // A second cleanup on the already-removed directory must not fail.
        workdir.cleanup().await;
        assert!(!workdir.path().exists());
    }

    #[tokio::test]
    async fn test_directories_are_exclusive() {
        let root = TempDir::new().unwrap();
        let a = WorkDir::create(root.path()).await.unwrap();
        let b = WorkDir::create(root.path()).await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_drop_removes_leftover_directory() {
        let root = TempDir::new().unwrap();
        let path = {
            let workdir = WorkDir::create(root.path()).await.unwrap();
            workdir.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Artifacts kept on local disk under the upload directory
///
/// Stored files are named `{uuid}_{display name}` so two artifacts with the
/// same display name never collide.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserves a fresh path for `display_name`, creating the upload
    /// directory when needed
    pub async fn allocate(&self, display_name: &str) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(self.root.join(format!("{}_{}", Uuid::new_v4(), display_name)))
    }

    /// Writes `bytes` to a fresh path and returns it
    pub async fn store(&self, bytes: &[u8], display_name: &str) -> io::Result<PathBuf> {
        let path = self.allocate(display_name).await?;
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    pub async fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(tokio::fs::metadata(path).await?.len())
    }

    /// Removes a stored file, returning whether a file was actually deleted
    pub async fn delete(&self, path: &Path) -> bool {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!("Deleted local artifact {}", path.display());
                true
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!("Failed to delete local artifact {}: {}", path.display(), e);
                false
            }
        }
    }
}

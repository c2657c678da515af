use super::StorageError;
use async_trait::async_trait;
use serde::Serialize;

/// Outcome of a remote availability check
///
/// Computed once per crawl run; credentials may be revoked or renewed
/// between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageProbe {
    pub available: bool,
    pub message: String,
}

impl StorageProbe {
    pub fn available(message: impl Into<String>) -> Self {
        Self {
            available: true,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
        }
    }
}

/// Authoritative metadata reported by the remote provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMetadata {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

/// Capability interface of the remote document store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Checks that credentials are present and the target folder is reachable
    async fn probe(&self) -> StorageProbe;

    /// Uploads `bytes` and returns the new object id
    async fn upload(&self, bytes: Vec<u8>, name: &str, mime_type: &str) -> Result<String, StorageError>;

    async fn metadata(&self, id: &str) -> Result<RemoteMetadata, StorageError>;

    /// Direct download link for a stored object
    async fn download_link(&self, id: &str) -> Result<String, StorageError>;

    async fn delete(&self, id: &str) -> Result<(), StorageError>;
}

/// Remote store used when the remote tier is turned off in configuration
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRemote;

#[async_trait]
impl RemoteStore for DisabledRemote {
    async fn probe(&self) -> StorageProbe {
        StorageProbe::unavailable("Remote storage is disabled in configuration")
    }

    async fn upload(&self, _bytes: Vec<u8>, _name: &str, _mime_type: &str) -> Result<String, StorageError> {
        Err(StorageError::RemoteUpload("remote storage is disabled".to_string()))
    }

    async fn metadata(&self, _id: &str) -> Result<RemoteMetadata, StorageError> {
        Err(StorageError::RemoteUpload("remote storage is disabled".to_string()))
    }

    async fn download_link(&self, _id: &str) -> Result<String, StorageError> {
        Err(StorageError::RemoteUpload("remote storage is disabled".to_string()))
    }

    async fn delete(&self, _id: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

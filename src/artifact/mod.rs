//! Artifact acquisition and storage
//!
//! An artifact is the binary document behind a record's download link. It is
//! downloaded by [`ArtifactAcquirer`] into the local upload directory and then
//! placed by [`ArtifactStorageRouter`] on the remote tier, kept locally, or
//! discarded, depending on remote availability and the retention flag.

mod acquire;
mod drive;
mod filename;
mod local;
mod remote;
mod router;
mod share_link;

use serde::Serialize;
use thiserror::Error;

pub use acquire::{AcquiredArtifact, ArtifactAcquirer};
pub use drive::DriveClient;
pub use filename::{
    default_name, filename_from_content_disposition, filename_from_url, is_default_name,
    mime_for, preferred_name, sanitize_filename,
};
pub use local::LocalStore;
pub use remote::{DisabledRemote, RemoteMetadata, RemoteStore, StorageProbe};
pub use router::{ArtifactStorageRouter, Placement};
pub use share_link::{direct_download_url, extract_file_id, is_document_host, normalize_share_link};

/// Where an artifact ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StorageTier {
    Remote,
    Local,
    /// The record is persisted without an attachment
    None,
}

impl StorageTier {
    /// Returns the string representation used in the catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageTier::Remote => "remote",
            StorageTier::Local => "local",
            StorageTier::None => "none",
        }
    }

    /// Parses a tier from its catalog representation
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "remote" => Some(StorageTier::Remote),
            "local" => Some(StorageTier::Local),
            "none" => Some(StorageTier::None),
            _ => None,
        }
    }
}

impl std::fmt::Display for StorageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage outcome attached to a persisted record
///
/// Whenever `tier` is not [`StorageTier::None`], `size_bytes` is at least
/// [`crate::MIN_ARTIFACT_BYTES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDescriptor {
    pub display_name: String,
    /// Remote object id or local file path, depending on `tier`
    pub storage_key: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub tier: StorageTier,
}

impl ArtifactDescriptor {
    /// Descriptor for a record persisted without an attachment
    pub fn detached() -> Self {
        Self {
            display_name: String::new(),
            storage_key: String::new(),
            mime_type: String::new(),
            size_bytes: 0,
            tier: StorageTier::None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.tier != StorageTier::None
    }
}

/// Errors produced while downloading an artifact
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("Network error downloading {url}: {message}")]
    Network { url: String, message: String },

    #[error("Disallowed format '{content_type}' at {url}")]
    DisallowedFormat { url: String, content_type: String },

    #[error("Received an HTML page instead of a file from {url}")]
    InterstitialPage { url: String },

    #[error("Artifact too small: {size} bytes (minimum {} bytes)", crate::MIN_ARTIFACT_BYTES)]
    ArtifactTooSmall { size: u64 },

    #[error("IO error writing artifact: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while placing an artifact on a storage tier
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Remote storage authorization failed: {0}")]
    RemoteAuth(String),

    #[error("Remote storage quota exceeded: {0}")]
    RemoteQuota(String),

    #[error("Remote upload failed: {0}")]
    RemoteUpload(String),

    #[error("Local storage IO error: {0}")]
    LocalIo(#[from] std::io::Error),

    #[error("Stored artifact too small: {size} bytes (minimum {} bytes)", crate::MIN_ARTIFACT_BYTES)]
    ArtifactTooSmall { size: u64 },
}

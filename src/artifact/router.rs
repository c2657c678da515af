use super::acquire::AcquiredArtifact;
use super::filename::is_default_name;
use super::local::LocalStore;
use super::remote::{RemoteStore, StorageProbe};
use super::{ArtifactDescriptor, StorageError, StorageTier};
use crate::MIN_ARTIFACT_BYTES;
use std::sync::Arc;

/// Where an acquired artifact was placed
#[derive(Debug)]
pub struct Placement {
    pub descriptor: ArtifactDescriptor,
    /// Remote failure that pushed the artifact down to the local tier
    pub fallback: Option<StorageError>,
}

impl Placement {
    fn placed(descriptor: ArtifactDescriptor) -> Self {
        Self {
            descriptor,
            fallback: None,
        }
    }
}

/// Chooses between the remote and local tiers for acquired artifacts
///
/// # Placement Policy
///
/// | Remote | Upload | `retain_local` | Result |
/// |--------|--------|----------------|--------|
/// | available | ok | false | Remote, local copy deleted |
/// | available | ok | true | Remote, local copy kept |
/// | available | failed | any | Local, with fallback reason |
/// | unavailable | - | true | Local |
/// | unavailable | - | false | None, local copy deleted |
///
/// A remote copy smaller than [`MIN_ARTIFACT_BYTES`] is deleted from both
/// tiers and reported as [`StorageError::ArtifactTooSmall`]. A local copy
/// that cannot be read back is deleted and reported as
/// [`StorageError::LocalIo`].
pub struct ArtifactStorageRouter {
    remote: Arc<dyn RemoteStore>,
    local: LocalStore,
}

impl ArtifactStorageRouter {
    pub fn new(remote: Arc<dyn RemoteStore>, local: LocalStore) -> Self {
        Self { remote, local }
    }

    pub async fn probe(&self) -> StorageProbe {
        self.remote.probe().await
    }

    /// Places `artifact` according to the policy above
    pub async fn store(
        &self,
        artifact: AcquiredArtifact,
        probe: &StorageProbe,
        retain_local: bool,
    ) -> Result<Placement, StorageError> {
        if !probe.available {
            if retain_local {
                tracing::info!("Remote unavailable, keeping '{}' locally", artifact.display_name);
                return Ok(Placement::placed(local_descriptor(&artifact)));
            }

            tracing::info!(
                "Remote unavailable and local retention declined, discarding '{}'",
                artifact.display_name
            );
            self.local.delete(&artifact.path).await;
            return Ok(Placement::placed(ArtifactDescriptor::detached()));
        }

        let bytes = match tokio::fs::read(&artifact.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    "Could not read '{}' for upload, discarding it: {}",
                    artifact.display_name,
                    e
                );
                self.local.delete(&artifact.path).await;
                return Err(StorageError::LocalIo(e));
            }
        };

        let id = match self
            .remote
            .upload(bytes, &artifact.display_name, &artifact.mime_type)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Remote upload of '{}' failed: {}", artifact.display_name, e);
                return Ok(Placement {
                    descriptor: local_descriptor(&artifact),
                    fallback: Some(e),
                });
            }
        };

        let metadata = match self.remote.metadata(&id).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Could not read metadata of remote object {}: {}", id, e);
                self.delete_remote(&id).await;
                return Ok(Placement {
                    descriptor: local_descriptor(&artifact),
                    fallback: Some(e),
                });
            }
        };

        if metadata.size_bytes < MIN_ARTIFACT_BYTES {
            tracing::warn!(
                "Remote object {} is only {} bytes, removing it",
                id,
                metadata.size_bytes
            );
            self.delete_remote(&id).await;
            self.local.delete(&artifact.path).await;
            return Err(StorageError::ArtifactTooSmall {
                size: metadata.size_bytes,
            });
        }

        if !retain_local {
            self.local.delete(&artifact.path).await;
        }

        let display_name = if is_default_name(&artifact.display_name) && !metadata.name.is_empty() {
            metadata.name
        } else {
            artifact.display_name
        };

        let mime_type = if metadata.mime_type.is_empty() {
            artifact.mime_type
        } else {
            metadata.mime_type
        };

        Ok(Placement::placed(ArtifactDescriptor {
            display_name,
            storage_key: id,
            mime_type,
            size_bytes: metadata.size_bytes,
            tier: StorageTier::Remote,
        }))
    }

    /// Removes a placed artifact from whichever tier holds it
    ///
    /// Used when the record it belongs to could not be persisted.
    pub async fn discard(&self, descriptor: &ArtifactDescriptor) {
        match descriptor.tier {
            StorageTier::Remote => self.delete_remote(&descriptor.storage_key).await,
            StorageTier::Local => {
                self.local
                    .delete(std::path::Path::new(&descriptor.storage_key))
                    .await;
            }
            StorageTier::None => {}
        }
    }

    async fn delete_remote(&self, id: &str) {
        if let Err(e) = self.remote.delete(id).await {
            tracing::warn!("Failed to delete remote object {}: {}", id, e);
        }
    }
}

fn local_descriptor(artifact: &AcquiredArtifact) -> ArtifactDescriptor {
    ArtifactDescriptor {
        display_name: artifact.display_name.clone(),
        storage_key: artifact.path.to_string_lossy().into_owned(),
        mime_type: artifact.mime_type.clone(),
        size_bytes: artifact.size_bytes,
        tier: StorageTier::Local,
    }
}

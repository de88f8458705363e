//! YAML-file backed configuration persistence.
//!
//! The file holds a [`CollectionsDocument`]: a `collections` list and an
//! optional `views` list. The same format is used for declared collections
//! loaded by the `folio` binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_sdk::types::Collection;
use parking_lot::RwLock;
use tracing::{info, warn};

use super::{CollectionsDocument, ConfigurationPersistence, PersistedCollections};
use crate::error::{NavigationError, NavigationResult};
use crate::navigation::paths::{remove_initial_and_trailing_slashes, validate_collection_path};

/// Maximum collections file size (10 MB). Larger files are refused rather
/// than read into memory.
const MAX_COLLECTIONS_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read and parse a collections document.
pub async fn load_document(path: &Path) -> Result<CollectionsDocument> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("failed to stat {}", path.display()))?;
    if metadata.len() > MAX_COLLECTIONS_FILE_SIZE {
        anyhow::bail!(
            "{} exceeds the maximum collections file size ({} bytes)",
            path.display(),
            MAX_COLLECTIONS_FILE_SIZE
        );
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

/// Parse a collections document from YAML text.
pub fn parse_document(contents: &str) -> Result<CollectionsDocument> {
    if contents.trim().is_empty() {
        return Ok(CollectionsDocument::default());
    }
    Ok(serde_yml::from_str(contents)?)
}

/// Persisted collections stored in a single YAML file.
///
/// The file is read by [`YamlConfigPersistence::open`] and
/// [`YamlConfigPersistence::reload`]; read failures are reported through the
/// snapshot's `error` field so navigation can fall back to declared
/// collections. Every save or delete rewrites the whole file.
#[derive(Debug)]
pub struct YamlConfigPersistence {
    path: PathBuf,
    state: RwLock<PersistedCollections>,
}

impl YamlConfigPersistence {
    /// Open the store, reading the file if it exists.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let store = Self {
            path: path.into(),
            state: RwLock::new(PersistedCollections {
                loading: true,
                ..Default::default()
            }),
        };
        store.reload().await;
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file. A missing file counts as an empty store.
    pub async fn reload(&self) {
        self.state.write().loading = true;

        let loaded = match tokio::fs::try_exists(&self.path).await {
            Ok(true) => load_document(&self.path).await.map(|doc| doc.collections),
            Ok(false) => Ok(Vec::new()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("failed to check {}", self.path.display()))),
        };

        let mut state = self.state.write();
        state.loading = false;
        match loaded {
            Ok(collections) => {
                info!(
                    path = %self.path.display(),
                    collections = collections.len(),
                    "loaded persisted collections"
                );
                state.collections = collections;
                state.error = None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to load persisted collections");
                state.error = Some(format!("{e:#}"));
            }
        }
    }

    /// Writes are refused until the file has loaded cleanly, so a file that
    /// failed to parse is never overwritten with a partial list.
    fn ensure_writable(&self, state: &PersistedCollections) -> NavigationResult<()> {
        match &state.error {
            Some(error) => Err(anyhow::anyhow!(
                "{} was not loaded ({error}); refusing to overwrite it",
                self.path.display()
            )
            .into()),
            None => Ok(()),
        }
    }

    fn write_file(&self, collections: &[Collection]) -> Result<()> {
        let document = CollectionsDocument {
            collections: collections.to_vec(),
            views: Vec::new(),
        };
        let yaml = serde_yml::to_string(&document).context("failed to serialize collections")?;
        std::fs::write(&self.path, yaml)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl ConfigurationPersistence for YamlConfigPersistence {
    fn snapshot(&self) -> PersistedCollections {
        self.state.read().clone()
    }

    fn save_collection(&self, collection: Collection) -> NavigationResult<()> {
        validate_collection_path(&collection.path)?;

        let mut state = self.state.write();
        self.ensure_writable(&state)?;
        let mut collections = state.collections.clone();
        match collections.iter_mut().find(|c| c.path == collection.path) {
            Some(existing) => *existing = collection,
            None => collections.push(collection),
        }

        self.write_file(&collections)?;
        state.collections = collections;
        Ok(())
    }

    fn delete_collection(&self, path: &str) -> NavigationResult<()> {
        let path = remove_initial_and_trailing_slashes(path);

        let mut state = self.state.write();
        self.ensure_writable(&state)?;
        let mut collections = state.collections.clone();
        let before = collections.len();
        collections.retain(|c| c.path != path);
        if collections.len() == before {
            return Err(NavigationError::CollectionNotFound {
                path: path.to_string(),
            });
        }

        self.write_file(&collections)?;
        state.collections = collections;
        Ok(())
    }
}

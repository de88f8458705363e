//! In-process configuration persistence.

use folio_sdk::types::Collection;
use parking_lot::RwLock;
use tracing::info;

use super::{ConfigurationPersistence, PersistedCollections};
use crate::error::{NavigationError, NavigationResult};
use crate::navigation::paths::{remove_initial_and_trailing_slashes, validate_collection_path};

/// Persisted collections held in memory.
///
/// Hosts that fetch collections from elsewhere push results in with
/// [`MemoryConfigPersistence::replace`] and flag fetches with
/// [`MemoryConfigPersistence::set_loading`] / [`MemoryConfigPersistence::set_error`].
#[derive(Debug, Default)]
pub struct MemoryConfigPersistence {
    state: RwLock<PersistedCollections>,
}

impl MemoryConfigPersistence {
    pub fn new(collections: Vec<Collection>) -> Self {
        Self {
            state: RwLock::new(PersistedCollections {
                collections,
                loading: false,
                error: None,
            }),
        }
    }

    /// A store that has not finished its first fetch.
    pub fn loading() -> Self {
        Self {
            state: RwLock::new(PersistedCollections {
                loading: true,
                ..Default::default()
            }),
        }
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.write().loading = loading;
    }

    pub fn set_error(&self, error: Option<String>) {
        self.state.write().error = error;
    }

    /// Replace all collections and clear the loading and error flags.
    pub fn replace(&self, collections: Vec<Collection>) {
        *self.state.write() = PersistedCollections {
            collections,
            loading: false,
            error: None,
        };
    }
}

impl ConfigurationPersistence for MemoryConfigPersistence {
    fn snapshot(&self) -> PersistedCollections {
        self.state.read().clone()
    }

    fn save_collection(&self, collection: Collection) -> NavigationResult<()> {
        validate_collection_path(&collection.path)?;

        let mut state = self.state.write();
        match state
            .collections
            .iter_mut()
            .find(|c| c.path == collection.path)
        {
            Some(existing) => *existing = collection,
            None => state.collections.push(collection),
        }
        info!(collections = state.collections.len(), "persisted collection saved");
        Ok(())
    }

    fn delete_collection(&self, path: &str) -> NavigationResult<()> {
        let path = remove_initial_and_trailing_slashes(path);
        let mut state = self.state.write();
        let before = state.collections.len();
        state.collections.retain(|c| c.path != path);

        if state.collections.len() == before {
            return Err(NavigationError::CollectionNotFound {
                path: path.to_string(),
            });
        }
        info!(path, "persisted collection deleted");
        Ok(())
    }
}

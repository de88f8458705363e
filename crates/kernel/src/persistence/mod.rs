//! Collaborators that store collection configuration.
//!
//! Two stores feed navigation:
//!
//! - [`ConfigurationPersistence`] holds runtime-managed collections that are
//!   joined with the declared ones on every refresh.
//! - [`UserConfigurationPersistence`] holds per-user overrides applied at
//!   lookup time.
//!
//! Both are synchronous from the kernel's point of view; loading happens in
//! the implementations and is reported through [`PersistedCollections`].

mod memory;
mod user;
pub mod yaml;

use folio_sdk::types::{Collection, CollectionPatch, View};
use serde::{Deserialize, Serialize};

use crate::error::NavigationResult;

pub use memory::MemoryConfigPersistence;
pub use user::MemoryUserConfigPersistence;
pub use yaml::YamlConfigPersistence;

/// Snapshot of the persisted collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedCollections {
    pub collections: Vec<Collection>,
    /// Set while the store is still fetching; navigation keeps its previous state.
    pub loading: bool,
    /// Set when the last fetch failed.
    pub error: Option<String>,
}

/// Store of runtime-managed collections.
pub trait ConfigurationPersistence: Send + Sync {
    fn snapshot(&self) -> PersistedCollections;

    /// Insert or replace the collection with the same path.
    ///
    /// Paths with an even number of segments are rejected.
    fn save_collection(&self, collection: Collection) -> NavigationResult<()>;

    fn delete_collection(&self, path: &str) -> NavigationResult<()>;
}

/// Store of per-user collection overrides, keyed by collection path.
pub trait UserConfigurationPersistence: Send + Sync {
    fn get_collection_config(&self, path: &str) -> Option<CollectionPatch>;

    fn set_collection_config(&self, path: &str, patch: CollectionPatch);
}

/// On-disk document listing collections and views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionsDocument {
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<View>,
}

/// Every path (recursively through subcollections) with an even segment count.
pub fn invalid_collection_paths(collections: &[Collection]) -> Vec<String> {
    fn walk(collections: &[Collection], prefix: &str, out: &mut Vec<String>) {
        for collection in collections {
            let full = if prefix.is_empty() {
                collection.path.clone()
            } else {
                format!("{prefix}/{{id}}/{}", collection.path)
            };
            if !crate::navigation::paths::is_valid_collection_path(&collection.path) {
                out.push(full.clone());
            }
            if let Some(subcollections) = &collection.subcollections {
                walk(subcollections, &full, out);
            }
        }
    }

    let mut out = Vec::new();
    walk(collections, "", &mut out);
    out
}

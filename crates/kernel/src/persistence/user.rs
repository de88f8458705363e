//! Per-user collection overrides.

use dashmap::DashMap;
use folio_sdk::Merge;
use folio_sdk::types::CollectionPatch;

use super::UserConfigurationPersistence;
use crate::navigation::paths::remove_initial_and_trailing_slashes;

/// User overrides held in a concurrent map, keyed by collection path.
#[derive(Debug, Default)]
pub struct MemoryUserConfigPersistence {
    configs: DashMap<String, CollectionPatch>,
}

impl MemoryUserConfigPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `patch` into the stored override instead of replacing it.
    pub fn update_collection_config(&self, path: &str, patch: CollectionPatch) {
        let key = remove_initial_and_trailing_slashes(path).to_string();
        let merged = match self.configs.remove(&key) {
            Some((_, existing)) => merge_patches(existing, patch),
            None => patch,
        };
        self.configs.insert(key, merged);
    }

    pub fn clear(&self, path: &str) {
        self.configs.remove(remove_initial_and_trailing_slashes(path));
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl UserConfigurationPersistence for MemoryUserConfigPersistence {
    fn get_collection_config(&self, path: &str) -> Option<CollectionPatch> {
        self.configs
            .get(remove_initial_and_trailing_slashes(path))
            .map(|entry| entry.value().clone())
    }

    fn set_collection_config(&self, path: &str, patch: CollectionPatch) {
        self.configs
            .insert(remove_initial_and_trailing_slashes(path).to_string(), patch);
    }
}

fn merge_patches(base: CollectionPatch, overlay: CollectionPatch) -> CollectionPatch {
    CollectionPatch {
        name: base.name.merge(overlay.name),
        alias: base.alias.merge(overlay.alias),
        singular_name: base.singular_name.merge(overlay.singular_name),
        description: base.description.merge(overlay.description),
        group: base.group.merge(overlay.group),
        icon: base.icon.merge(overlay.icon),
        properties: base.properties.merge(overlay.properties),
        property_order: base.property_order.merge(overlay.property_order),
        subcollections: base.subcollections.merge(overlay.subcollections),
        callbacks: base.callbacks.merge(overlay.callbacks),
        permissions: base.permissions.merge(overlay.permissions),
        editable: base.editable.merge(overlay.editable),
        deletable: base.deletable.merge(overlay.deletable),
    }
}

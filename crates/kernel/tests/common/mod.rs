#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common helpers for kernel integration tests.
//!
//! Everything here drives the real kernel types; persistence is either the
//! in-memory store or a YAML file in a unique temp directory.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_kernel::NavigationConfig;
use folio_kernel::navigation::NavigationController;
use folio_kernel::permissions::PermissionResolver;
use folio_kernel::persistence::MemoryConfigPersistence;
use folio_sdk::types::{Collection, Permissions, User};
use folio_test_utils::catalog;
use uuid::Uuid;

/// Default configuration: mounted at `/`, collections under `/c`.
pub fn config() -> NavigationConfig {
    NavigationConfig::default()
}

/// A resolver that looks permissions up by joined collection path.
///
/// Paths not in the table are fully granted.
pub fn path_resolver(table: &[(&str, Permissions)]) -> Arc<dyn PermissionResolver> {
    let table: HashMap<String, Permissions> = table
        .iter()
        .map(|(path, permissions)| ((*path).to_string(), *permissions))
        .collect();
    Arc::new(
        move |_collection: &Collection, _user: Option<&User>, segments: &[String]| {
            table
                .get(&segments.join("/"))
                .copied()
                .unwrap_or(Permissions::ALL)
        },
    )
}

/// A controller over the stock catalog with an in-memory persisted store.
pub fn catalog_controller() -> (NavigationController, Arc<MemoryConfigPersistence>) {
    let store = Arc::new(MemoryConfigPersistence::new(catalog::persisted()));
    let controller = NavigationController::builder(&config())
        .collections(catalog::declared())
        .views(catalog::views())
        .config_persistence(store.clone())
        .build();
    (controller, store)
}

/// A unique directory under the system temp dir, removed on drop even if
/// the test panics.
pub struct TestDir(PathBuf);

impl TestDir {
    pub fn new(prefix: &str) -> Self {
        let path = std::env::temp_dir().join(format!("folio-{prefix}-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Path of the collections file inside this directory (not created).
    pub fn collections_file(&self) -> PathBuf {
        self.0.join("collections.yaml")
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

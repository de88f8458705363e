//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Navigation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationConfig {
    /// Base path the admin interface is mounted under (default: "/").
    pub base_path: String,

    /// Path segment under `base_path` that collection URLs live in (default: "c").
    pub base_collection_path: String,

    /// Deepest nesting level at which collections may still be deleted.
    /// Top-level collections are depth 0. `None` means no structural limit.
    pub max_deletable_depth: Option<usize>,

    /// YAML file with declared collections and views (CLI only).
    pub collections_file: Option<PathBuf>,

    /// YAML file backing persisted collection overrides (CLI only).
    pub persisted_collections_file: Option<PathBuf>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            base_collection_path: "c".to_string(),
            max_deletable_depth: None,
            collections_file: None,
            persisted_collections_file: None,
        }
    }
}

impl NavigationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let base_path = lookup("FOLIO_BASE_PATH").unwrap_or(defaults.base_path);

        let base_collection_path =
            lookup("FOLIO_BASE_COLLECTION_PATH").unwrap_or(defaults.base_collection_path);

        let max_deletable_depth = lookup("FOLIO_MAX_DELETABLE_DEPTH")
            .map(|v| v.trim().parse::<usize>())
            .transpose()
            .context("FOLIO_MAX_DELETABLE_DEPTH must be a valid usize")?;

        let collections_file = lookup("FOLIO_COLLECTIONS_FILE").map(PathBuf::from);

        let persisted_collections_file =
            lookup("FOLIO_PERSISTED_COLLECTIONS_FILE").map(PathBuf::from);

        Ok(Self {
            base_path,
            base_collection_path,
            max_deletable_depth,
            collections_file,
            persisted_collections_file,
        })
    }
}

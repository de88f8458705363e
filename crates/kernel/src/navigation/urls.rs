//! URL construction for collections and views.

use super::paths::{encode_path, remove_initial_and_trailing_slashes};
use crate::error::{NavigationError, NavigationResult};

/// Builds and parses admin URLs.
///
/// Collections live under `/{base_path}/{base_collection_path}/...`, views
/// directly under `/{base_path}/...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationUrls {
    base_path: String,
    base_collection_path: String,
}

impl NavigationUrls {
    pub fn new(base_path: &str, base_collection_path: &str) -> Self {
        Self {
            base_path: remove_initial_and_trailing_slashes(base_path).to_string(),
            base_collection_path: remove_initial_and_trailing_slashes(base_collection_path)
                .to_string(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn base_collection_path(&self) -> &str {
        &self.base_collection_path
    }

    /// `/{base_path}`, or `/` when mounted at the root.
    pub fn home_url(&self) -> String {
        if self.base_path.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", self.base_path)
        }
    }

    /// Absolute URL prefix of every collection URL.
    pub fn full_collection_path(&self) -> String {
        if self.base_path.is_empty() {
            format!("/{}", self.base_collection_path)
        } else {
            format!("/{}/{}", self.base_path, self.base_collection_path)
        }
    }

    pub fn build_url_collection_path(&self, path: &str) -> String {
        format!("{}/{}", self.full_collection_path(), encode_path(path))
    }

    pub fn build_cms_url_path(&self, path: &str) -> String {
        if self.base_path.is_empty() {
            format!("/{}", encode_path(path))
        } else {
            format!("/{}/{}", self.base_path, encode_path(path))
        }
    }

    /// URL of the collection configuration editor.
    pub fn build_url_edit_collection_path(&self, path: &str) -> String {
        self.build_cms_url_path(&format!("s/edit/{}", remove_initial_and_trailing_slashes(path)))
    }

    /// Whether `url` points at something below the collection base path.
    pub fn is_url_collection_path(&self, url: &str) -> bool {
        let full = self.full_collection_path();
        let prefix = format!("{}/", remove_initial_and_trailing_slashes(&full));
        remove_initial_and_trailing_slashes(url).starts_with(&prefix)
    }

    /// Strip the collection base path from `url`, leaving the data path.
    pub fn url_path_to_data_path(&self, url: &str) -> NavigationResult<String> {
        let full = self.full_collection_path();
        let outside = || NavigationError::PathOutsideBase {
            expected: full.clone(),
            path: url.to_string(),
        };

        let rest = url.strip_prefix(full.as_str()).ok_or_else(outside)?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return Err(outside());
        }
        Ok(remove_initial_and_trailing_slashes(rest).to_string())
    }
}

//! The navigation resolver: a pure function from inputs to a navigation model.

use std::sync::Arc;

use folio_sdk::types::{Collection, User, View};
use serde::Serialize;
use tracing::debug;

use super::join::join_collections;
use super::top::{TopNavigationResult, compute_top_navigation};
use super::urls::NavigationUrls;
use crate::config::NavigationConfig;
use crate::permissions::{
    AccessContext, DefaultPermissionResolver, PermissionResolver, resolve_collections_permissions,
};

/// Output of a navigation resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NavigationModel {
    /// Joined, permission-filtered collections.
    pub collections: Vec<Collection>,
    pub views: Vec<View>,
    pub top_level_navigation: TopNavigationResult,
}

/// Resolves navigation for a user from declared and persisted collections.
#[derive(Clone)]
pub struct NavigationResolver {
    urls: NavigationUrls,
    permissions: Arc<dyn PermissionResolver>,
    max_deletable_depth: Option<usize>,
}

impl NavigationResolver {
    pub fn new(config: &NavigationConfig) -> Self {
        Self {
            urls: NavigationUrls::new(&config.base_path, &config.base_collection_path),
            permissions: Arc::new(DefaultPermissionResolver),
            max_deletable_depth: config.max_deletable_depth,
        }
    }

    /// Replace the default permission resolver.
    pub fn with_permission_resolver(mut self, resolver: Arc<dyn PermissionResolver>) -> Self {
        self.permissions = resolver;
        self
    }

    pub fn urls(&self) -> &NavigationUrls {
        &self.urls
    }

    pub fn permission_resolver(&self) -> &dyn PermissionResolver {
        self.permissions.as_ref()
    }

    /// Capability checks for `user` with this resolver's settings.
    pub fn access<'a>(&'a self, user: Option<&'a User>) -> AccessContext<'a> {
        AccessContext::new(user, self.permissions.as_ref())
            .with_max_deletable_depth(self.max_deletable_depth)
    }

    /// Join, filter and flatten the inputs into a navigation model.
    ///
    /// An absent persisted list is treated as empty.
    pub fn resolve(
        &self,
        declared: &[Collection],
        persisted: Option<&[Collection]>,
        views: &[View],
        user: Option<&User>,
    ) -> NavigationModel {
        let joined = join_collections(persisted.unwrap_or_default(), declared);
        let collections =
            resolve_collections_permissions(joined, user, self.permissions.as_ref(), &[]);
        let top_level_navigation =
            compute_top_navigation(&collections, views, &self.urls, &self.access(user));

        debug!(
            collections = collections.len(),
            entries = top_level_navigation.navigation_entries.len(),
            groups = top_level_navigation.groups.len(),
            user = user.map(|u| u.uid.as_str()).unwrap_or("anonymous"),
            "resolved navigation"
        );

        NavigationModel {
            collections,
            views: views.to_vec(),
            top_level_navigation,
        }
    }
}

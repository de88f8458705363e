//! The navigation context handed to consumers.

use std::sync::Arc;

use folio_sdk::types::{Collection, CollectionPatch, User, View};

use super::lookup::{get_collection_by_path, resolve_collection_aliases};
use super::paths::remove_initial_and_trailing_slashes;
use super::resolver::NavigationModel;
use super::top::TopNavigationResult;
use super::urls::NavigationUrls;
use crate::error::{NavigationError, NavigationResult};
use crate::persistence::UserConfigurationPersistence;

/// Supplies per-path overrides at lookup time.
///
/// Fields the returned patch supplies take precedence over the base
/// collection (after user overrides). `subcollections`, `callbacks` and
/// `permissions` fall back to the base values when the patch leaves them out.
pub trait CollectionOverrideHandler: Send + Sync {
    fn resolve(&self, path: &str, entity_id: Option<&str>) -> Option<CollectionPatch>;
}

impl<F> CollectionOverrideHandler for F
where
    F: Fn(&str, Option<&str>) -> Option<CollectionPatch> + Send + Sync,
{
    fn resolve(&self, path: &str, entity_id: Option<&str>) -> Option<CollectionPatch> {
        self(path, entity_id)
    }
}

/// Decides whether a user may create new collections (optionally in a group).
pub trait CollectionCreationPolicy: Send + Sync {
    fn can_create_collections(&self, user: Option<&User>, group: Option<&str>) -> bool;
}

impl<F> CollectionCreationPolicy for F
where
    F: Fn(Option<&User>, Option<&str>) -> bool + Send + Sync,
{
    fn can_create_collections(&self, user: Option<&User>, group: Option<&str>) -> bool {
        self(user, group)
    }
}

/// Collaborators consulted at lookup time.
#[derive(Clone, Default)]
pub struct LookupServices {
    pub user_config: Option<Arc<dyn UserConfigurationPersistence>>,
    pub override_handler: Option<Arc<dyn CollectionOverrideHandler>>,
    pub creation_policy: Option<Arc<dyn CollectionCreationPolicy>>,
}

/// A snapshot of resolved navigation state.
///
/// Until the first resolution completes the context is uninitialised: it
/// has no collections and alias resolution fails.
#[derive(Clone)]
pub struct NavigationContext {
    urls: NavigationUrls,
    model: Option<NavigationModel>,
    user: Option<User>,
    loading: bool,
    navigation_loading_error: Option<String>,
    services: LookupServices,
}

impl NavigationContext {
    /// A context with nothing resolved yet.
    pub fn uninitialised(urls: NavigationUrls, services: LookupServices) -> Self {
        Self {
            urls,
            model: None,
            user: None,
            loading: true,
            navigation_loading_error: None,
            services,
        }
    }

    /// A context holding a resolved model.
    pub fn resolved(
        urls: NavigationUrls,
        services: LookupServices,
        model: NavigationModel,
        user: Option<User>,
        navigation_loading_error: Option<String>,
    ) -> Self {
        Self {
            urls,
            model: Some(model),
            user,
            loading: false,
            navigation_loading_error,
            services,
        }
    }

    /// Copy of this context flagged as loading.
    pub fn mark_loading(&self) -> Self {
        Self {
            loading: true,
            ..self.clone()
        }
    }

    /// Copy of this context with the loading flag cleared.
    pub fn mark_settled(&self) -> Self {
        Self {
            loading: false,
            ..self.clone()
        }
    }

    pub fn initialised(&self) -> bool {
        self.model.is_some()
    }

    /// True until initialised, and while a refresh is in flight.
    pub fn loading(&self) -> bool {
        self.loading || self.model.is_none()
    }

    /// Error from the last persisted-collection load, if it failed.
    pub fn navigation_loading_error(&self) -> Option<&str> {
        self.navigation_loading_error.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn model(&self) -> Option<&NavigationModel> {
        self.model.as_ref()
    }

    pub fn collections(&self) -> Option<&[Collection]> {
        self.model.as_ref().map(|m| m.collections.as_slice())
    }

    pub fn views(&self) -> Option<&[View]> {
        self.model.as_ref().map(|m| m.views.as_slice())
    }

    pub fn top_level_navigation(&self) -> Option<&TopNavigationResult> {
        self.model.as_ref().map(|m| &m.top_level_navigation)
    }

    pub fn urls(&self) -> &NavigationUrls {
        &self.urls
    }

    pub fn home_url(&self) -> String {
        self.urls.home_url()
    }

    pub fn build_url_collection_path(&self, path: &str) -> String {
        self.urls.build_url_collection_path(path)
    }

    pub fn build_url_edit_collection_path(&self, path: &str) -> String {
        self.urls.build_url_edit_collection_path(path)
    }

    pub fn build_cms_url_path(&self, path: &str) -> String {
        self.urls.build_cms_url_path(path)
    }

    pub fn is_url_collection_path(&self, url: &str) -> bool {
        self.urls.is_url_collection_path(url)
    }

    pub fn url_path_to_data_path(&self, url: &str) -> NavigationResult<String> {
        self.urls.url_path_to_data_path(url)
    }

    /// Replace aliases in `path` with collection paths.
    pub fn resolve_aliases_from(&self, path: &str) -> NavigationResult<String> {
        let collections = self.collections().ok_or(NavigationError::NotInitialised)?;
        Ok(resolve_collection_aliases(path, collections))
    }

    /// Look up a collection, applying user and handler overrides.
    ///
    /// Precedence, lowest first: the resolved collection, the user override
    /// (deep-merged, only when `include_user_override` is set), then the
    /// override handler's patch. When no resolved collection exists but the
    /// handler supplies a patch, the patch alone describes the collection.
    pub fn get_collection(
        &self,
        path: &str,
        entity_id: Option<&str>,
        include_user_override: bool,
    ) -> Option<Collection> {
        let collections = self.collections()?;
        let clean = remove_initial_and_trailing_slashes(path);

        let base = get_collection_by_path(clean, collections).cloned();

        let user_override = if include_user_override {
            self.services
                .user_config
                .as_ref()
                .and_then(|p| p.get_collection_config(clean))
        } else {
            None
        };

        let overridden = match (base, user_override) {
            (Some(base), Some(patch)) => Some(base.merge_patch(patch)),
            (base, _) => base,
        };

        let handler_patch = self
            .services
            .override_handler
            .as_ref()
            .and_then(|h| h.resolve(clean, entity_id));

        match (overridden, handler_patch) {
            (Some(collection), Some(patch)) => Some(collection.with_overrides(patch)),
            (Some(collection), None) => Some(collection),
            (None, Some(patch)) => Some(Collection::new(clean, "").with_overrides(patch)),
            (None, None) => None,
        }
    }

    /// Whether the current user may create collections, optionally in `group`.
    ///
    /// Allowed when no creation policy is configured.
    pub fn can_create_collections(&self, group: Option<&str>) -> bool {
        match &self.services.creation_policy {
            Some(policy) => policy.can_create_collections(self.user.as_ref(), group),
            None => true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use folio_sdk::types::{CollectionCallbacks, Permissions, PermissionsSpec};

    use super::*;
    use crate::config::NavigationConfig;
    use crate::navigation::resolver::NavigationResolver;
    use crate::persistence::MemoryUserConfigPersistence;

    fn context_with(services: LookupServices, declared: Vec<Collection>) -> NavigationContext {
        let resolver = NavigationResolver::new(&NavigationConfig::default());
        let model = resolver.resolve(&declared, None, &[], None);
        NavigationContext::resolved(resolver.urls().clone(), services, model, None, None)
    }

    fn products() -> Collection {
        Collection::new("products", "Products")
            .group("Sales")
            .subcollection(Collection::new("locales", "Locales"))
    }

    #[test]
    fn uninitialised_context_rejects_alias_resolution() {
        let ctx = NavigationContext::uninitialised(
            NavigationUrls::new("/", "c"),
            LookupServices::default(),
        );
        assert!(ctx.loading());
        assert!(!ctx.initialised());
        assert!(matches!(
            ctx.resolve_aliases_from("products"),
            Err(NavigationError::NotInitialised)
        ));
        assert!(ctx.get_collection("products", None, false).is_none());
    }

    #[test]
    fn user_override_applies_only_when_requested() {
        let user_config = Arc::new(MemoryUserConfigPersistence::new());
        user_config.set_collection_config(
            "products",
            CollectionPatch {
                name: Some("My products".into()),
                ..Default::default()
            },
        );
        let services = LookupServices {
            user_config: Some(user_config),
            ..Default::default()
        };
        let ctx = context_with(services, vec![products()]);

        assert_eq!(ctx.get_collection("products", None, false).unwrap().name, "Products");
        let with_override = ctx.get_collection("/products/", None, true).unwrap();
        assert_eq!(with_override.name, "My products");
        assert_eq!(with_override.group.as_deref(), Some("Sales"));
    }

    #[test]
    fn handler_overrides_keep_structural_fields() {
        let handler = |path: &str, entity_id: Option<&str>| {
            (path == "products" && entity_id == Some("42")).then(|| CollectionPatch {
                name: Some("Product 42".into()),
                group: Some("Special".into()),
                ..Default::default()
            })
        };
        let services = LookupServices {
            override_handler: Some(Arc::new(handler)),
            ..Default::default()
        };
        let ctx = context_with(services, vec![products()]);

        let plain = ctx.get_collection("products", None, false).unwrap();
        assert_eq!(plain.name, "Products");

        let overridden = ctx.get_collection("products", Some("42"), false).unwrap();
        assert_eq!(overridden.name, "Product 42");
        assert_eq!(overridden.group.as_deref(), Some("Special"));
        assert_eq!(overridden.subcollections.as_ref().map(Vec::len), Some(1));
        assert_eq!(
            overridden.permissions,
            Some(PermissionsSpec::Fixed(Permissions::default()))
        );
    }

    #[test]
    fn handler_supplied_structural_fields_win() {
        let handler = |_: &str, _: Option<&str>| {
            Some(CollectionPatch {
                callbacks: Some(CollectionCallbacks {
                    on_save_success: Some("reindex".into()),
                    ..Default::default()
                }),
                permissions: Some(Permissions::READ_ONLY.into()),
                subcollections: Some(vec![]),
                ..Default::default()
            })
        };
        let services = LookupServices {
            override_handler: Some(Arc::new(handler)),
            ..Default::default()
        };
        let ctx = context_with(services, vec![products()]);

        let c = ctx.get_collection("products", None, false).unwrap();
        assert_eq!(c.subcollections, Some(vec![]));
        assert_eq!(c.permissions, Some(Permissions::READ_ONLY.into()));
        assert_eq!(
            c.callbacks.and_then(|cb| cb.on_save_success).as_deref(),
            Some("reindex")
        );
    }

    #[test]
    fn handler_can_describe_undeclared_collection() {
        let handler = |path: &str, _: Option<&str>| {
            (path == "dynamic").then(|| CollectionPatch {
                name: Some("Dynamic".into()),
                ..Default::default()
            })
        };
        let services = LookupServices {
            override_handler: Some(Arc::new(handler)),
            ..Default::default()
        };
        let ctx = context_with(services, vec![products()]);

        let c = ctx.get_collection("dynamic", None, false).unwrap();
        assert_eq!(c.path, "dynamic");
        assert_eq!(c.name, "Dynamic");
        assert!(ctx.get_collection("missing", None, false).is_none());
    }

    #[test]
    fn creation_policy_receives_group() {
        let policy = |_: Option<&User>, group: Option<&str>| group != Some("Locked");
        let services = LookupServices {
            creation_policy: Some(Arc::new(policy)),
            ..Default::default()
        };
        let ctx = context_with(services, vec![]);
        assert!(ctx.can_create_collections(None));
        assert!(ctx.can_create_collections(Some("Sales")));
        assert!(!ctx.can_create_collections(Some("Locked")));

        let open = context_with(LookupServices::default(), vec![]);
        assert!(open.can_create_collections(Some("Locked")));
    }
}

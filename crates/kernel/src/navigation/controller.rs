//! Navigation lifecycle: rebuilding the context when inputs change.
//!
//! The resolved state is recomputed, never patched. Each rebuild takes a
//! [`RefreshTicket`]; only the holder of the most recently issued ticket
//! may commit, so a slow refresh that finishes after a newer one started is
//! discarded instead of overwriting fresher state.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use folio_sdk::types::{Collection, User, View};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::context::{
    CollectionCreationPolicy, CollectionOverrideHandler, LookupServices, NavigationContext,
};
use super::paths::{full_path_to_collection_segments, remove_initial_and_trailing_slashes};
use super::resolver::NavigationResolver;
use crate::config::NavigationConfig;
use crate::error::{NavigationError, NavigationResult};
use crate::permissions::PermissionResolver;
use crate::persistence::{ConfigurationPersistence, UserConfigurationPersistence};

/// Proof that a refresh was started; see [`NavigationController::begin_refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Owns the navigation inputs and the latest resolved context.
#[derive(Clone)]
pub struct NavigationController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    resolver: NavigationResolver,
    declared: Vec<Collection>,
    views: Vec<View>,
    config_persistence: Option<Arc<dyn ConfigurationPersistence>>,
    services: LookupServices,
    generation: AtomicU64,
    context: RwLock<Arc<NavigationContext>>,
}

impl NavigationController {
    pub fn builder(config: &NavigationConfig) -> NavigationControllerBuilder {
        NavigationControllerBuilder {
            resolver: NavigationResolver::new(config),
            declared: Vec::new(),
            views: Vec::new(),
            config_persistence: None,
            services: LookupServices::default(),
        }
    }

    /// The latest committed context.
    pub fn context(&self) -> Arc<NavigationContext> {
        self.inner.context.read().clone()
    }

    pub fn resolver(&self) -> &NavigationResolver {
        &self.inner.resolver
    }

    /// Start a refresh, invalidating every ticket issued before.
    pub fn begin_refresh(&self) -> RefreshTicket {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "navigation refresh started");
        RefreshTicket { generation }
    }

    /// Whether `ticket` is still the most recent one.
    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Resolve navigation and commit it if `ticket` is still current.
    ///
    /// `persisted` is the outcome of fetching persisted collections: `Ok(None)`
    /// when there is no persisted source, `Err` when the fetch failed. A
    /// failed fetch still commits a context built from the declared
    /// collections, with the error recorded on it.
    ///
    /// Returns whether the result was committed.
    pub fn complete_refresh(
        &self,
        ticket: RefreshTicket,
        user: Option<&User>,
        persisted: anyhow::Result<Option<Vec<Collection>>>,
    ) -> bool {
        let (persisted, error) = match persisted {
            Ok(collections) => (collections, None),
            Err(e) => {
                warn!(error = %e, "failed to load persisted collections; using declared collections only");
                (None, Some(format!("{e:#}")))
            }
        };

        let model = self.inner.resolver.resolve(
            &self.inner.declared,
            persisted.as_deref(),
            &self.inner.views,
            user,
        );
        let context = NavigationContext::resolved(
            self.inner.resolver.urls().clone(),
            self.inner.services.clone(),
            model,
            user.cloned(),
            error,
        );

        let mut current = self.inner.context.write();
        if !self.is_current(ticket) {
            warn!(
                generation = ticket.generation,
                latest = self.inner.generation.load(Ordering::SeqCst),
                "discarding stale navigation refresh"
            );
            return false;
        }
        *current = Arc::new(context);
        info!(
            generation = ticket.generation,
            entries = current
                .top_level_navigation()
                .map(|t| t.navigation_entries.len())
                .unwrap_or_default(),
            "navigation refreshed"
        );
        true
    }

    /// Rebuild from the configuration persistence snapshot.
    ///
    /// While the store is still loading nothing happens and the previous
    /// context stays in place. Returns whether a new context was committed.
    pub fn refresh(&self, user: Option<&User>) -> bool {
        let snapshot = self.inner.config_persistence.as_ref().map(|p| p.snapshot());
        if snapshot.as_ref().is_some_and(|s| s.loading) {
            debug!("persisted collections still loading; keeping current navigation");
            return false;
        }

        let ticket = self.begin_refresh();
        let persisted = match snapshot {
            None => Ok(None),
            Some(s) => match s.error {
                Some(error) => Err(anyhow::anyhow!(error)),
                None => Ok(Some(s.collections)),
            },
        };
        self.complete_refresh(ticket, user, persisted)
    }

    /// Rebuild with persisted collections from an asynchronous loader.
    ///
    /// The current context is flagged as loading until the loader settles.
    pub async fn refresh_with<F>(&self, user: Option<User>, loader: F) -> bool
    where
        F: Future<Output = anyhow::Result<Vec<Collection>>>,
    {
        let ticket = self.begin_refresh();
        {
            let mut current = self.inner.context.write();
            let loading = Arc::new(current.mark_loading());
            *current = loading;
        }

        let mut guard = LoadingGuard {
            controller: self,
            ticket,
            armed: true,
        };
        let persisted = loader.await.map(Some);
        guard.armed = false;
        self.complete_refresh(ticket, user.as_ref(), persisted)
    }

    /// Refresh only when the user identity differs from the current context's.
    pub fn on_user_changed(&self, user: Option<&User>) -> bool {
        let context = self.context();
        let previous = context.user().map(|u| u.uid.as_str());
        if context.initialised() && previous == user.map(|u| u.uid.as_str()) {
            return false;
        }
        self.refresh(user)
    }

    /// Persist a collection and rebuild navigation for the current user.
    ///
    /// Replacing a collection requires edit permission on it; a new path
    /// goes through the creation policy. Persisted collections the user
    /// cannot read are never replaced.
    pub fn save_collection(&self, collection: Collection) -> NavigationResult<()> {
        let store = self.persistence()?;
        let context = self.context();
        let collections = context.collections().ok_or(NavigationError::NotInitialised)?;
        let clean = remove_initial_and_trailing_slashes(&collection.path);

        let access = self.inner.resolver.access(context.user());
        let allowed = match collections.iter().find(|c| c.path == clean) {
            Some(existing) => {
                let segments = full_path_to_collection_segments(&existing.path);
                access.can_edit_collection(existing, &segments)
            }
            None if store.snapshot().collections.iter().any(|c| c.path == clean) => false,
            None => context.can_create_collections(collection.group.as_deref()),
        };
        if !allowed {
            return Err(NavigationError::NotEditable {
                path: clean.to_string(),
            });
        }

        store.save_collection(collection)?;
        let user = context.user().cloned();
        self.refresh(user.as_ref());
        Ok(())
    }

    /// Delete a persisted collection the current user may delete.
    ///
    /// Collections with a declared definition are never deletable.
    pub fn delete_collection(&self, path: &str) -> NavigationResult<()> {
        let store = self.persistence()?;
        let context = self.context();
        let clean = remove_initial_and_trailing_slashes(path);

        let collection = context
            .collections()
            .ok_or(NavigationError::NotInitialised)?
            .iter()
            .find(|c| c.path == clean)
            .ok_or_else(|| NavigationError::CollectionNotFound {
                path: clean.to_string(),
            })?;

        let segments = full_path_to_collection_segments(&collection.path);
        let access = self.inner.resolver.access(context.user());
        if !access.can_delete_collection(collection, &segments) {
            return Err(NavigationError::NotDeletable {
                path: clean.to_string(),
            });
        }

        store.delete_collection(clean)?;
        let user = context.user().cloned();
        self.refresh(user.as_ref());
        Ok(())
    }

    fn persistence(&self) -> NavigationResult<&Arc<dyn ConfigurationPersistence>> {
        self.inner
            .config_persistence
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no configuration persistence configured").into())
    }
}

/// Clears the loading flag set by [`NavigationController::refresh_with`] when
/// its future is dropped before the loader settles.
struct LoadingGuard<'a> {
    controller: &'a NavigationController,
    ticket: RefreshTicket,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut current = self.controller.inner.context.write();
        if self.controller.is_current(self.ticket) {
            debug!(
                generation = self.ticket.generation,
                "navigation refresh cancelled"
            );
            let settled = Arc::new(current.mark_settled());
            *current = settled;
        }
    }
}

/// Builder for [`NavigationController`].
pub struct NavigationControllerBuilder {
    resolver: NavigationResolver,
    declared: Vec<Collection>,
    views: Vec<View>,
    config_persistence: Option<Arc<dyn ConfigurationPersistence>>,
    services: LookupServices,
}

impl NavigationControllerBuilder {
    pub fn collections(mut self, collections: Vec<Collection>) -> Self {
        self.declared = collections;
        self
    }

    pub fn views(mut self, views: Vec<View>) -> Self {
        self.views = views;
        self
    }

    pub fn permission_resolver(mut self, resolver: Arc<dyn PermissionResolver>) -> Self {
        self.resolver = self.resolver.with_permission_resolver(resolver);
        self
    }

    pub fn config_persistence(mut self, persistence: Arc<dyn ConfigurationPersistence>) -> Self {
        self.config_persistence = Some(persistence);
        self
    }

    pub fn user_config_persistence(
        mut self,
        persistence: Arc<dyn UserConfigurationPersistence>,
    ) -> Self {
        self.services.user_config = Some(persistence);
        self
    }

    pub fn override_handler(mut self, handler: Arc<dyn CollectionOverrideHandler>) -> Self {
        self.services.override_handler = Some(handler);
        self
    }

    pub fn creation_policy(mut self, policy: Arc<dyn CollectionCreationPolicy>) -> Self {
        self.services.creation_policy = Some(policy);
        self
    }

    /// Build the controller. Its context stays uninitialised until the
    /// first refresh commits.
    pub fn build(self) -> NavigationController {
        let context = NavigationContext::uninitialised(
            self.resolver.urls().clone(),
            self.services.clone(),
        );
        NavigationController {
            inner: Arc::new(ControllerInner {
                resolver: self.resolver,
                declared: self.declared,
                views: self.views,
                config_persistence: self.config_persistence,
                services: self.services,
                generation: AtomicU64::new(0),
                context: RwLock::new(Arc::new(context)),
            }),
        }
    }
}

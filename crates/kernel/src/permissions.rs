//! Permission resolution and capability checks for collections.

use std::collections::BTreeMap;

use folio_sdk::types::{Collection, Permissions, PermissionsSpec, User};
use tracing::debug;

/// Computes the capability set of a collection for a user.
///
/// `path_segments` holds the collection paths from the top level down to
/// (and including) `collection`, for resolvers that depend on nesting.
pub trait PermissionResolver: Send + Sync {
    fn resolve(
        &self,
        collection: &Collection,
        user: Option<&User>,
        path_segments: &[String],
    ) -> Permissions;
}

impl<F> PermissionResolver for F
where
    F: Fn(&Collection, Option<&User>, &[String]) -> Permissions + Send + Sync,
{
    fn resolve(
        &self,
        collection: &Collection,
        user: Option<&User>,
        path_segments: &[String],
    ) -> Permissions {
        self(collection, user, path_segments)
    }
}

/// Resolver that reads the collection's own [`PermissionsSpec`].
///
/// - No permissions declared: every flag unspecified.
/// - Fixed descriptor: returned as is.
/// - Role table: see [`resolve_role_permissions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPermissionResolver;

impl PermissionResolver for DefaultPermissionResolver {
    fn resolve(
        &self,
        collection: &Collection,
        user: Option<&User>,
        _path_segments: &[String],
    ) -> Permissions {
        match &collection.permissions {
            None => Permissions::default(),
            Some(PermissionsSpec::Fixed(permissions)) => *permissions,
            Some(PermissionsSpec::ByRole { roles }) => resolve_role_permissions(roles, user),
        }
    }
}

/// Combine the descriptors of every role the user holds.
///
/// A flag is granted when any matching role grants it, denied when a matching
/// role denies it and none grants it, and unspecified otherwise. A user with
/// no role in the table (or no user at all) gets [`Permissions::NONE`].
pub fn resolve_role_permissions(
    roles: &BTreeMap<String, Permissions>,
    user: Option<&User>,
) -> Permissions {
    let matching: Vec<&Permissions> = user
        .map(|u| u.roles.iter().filter_map(|r| roles.get(r)).collect())
        .unwrap_or_default();

    if matching.is_empty() {
        return Permissions::NONE;
    }

    let fold = |flag: fn(&Permissions) -> Option<bool>| {
        matching
            .iter()
            .copied()
            .map(flag)
            .fold(None, |acc, f| match (acc, f) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), _) | (_, Some(false)) => Some(false),
                _ => None,
            })
    };

    Permissions {
        read: fold(|p| p.read),
        create: fold(|p| p.create),
        edit: fold(|p| p.edit),
        delete: fold(|p| p.delete),
    }
}

/// Resolve permissions for every collection and drop unreadable ones.
///
/// Subcollections are resolved (and filtered) with the accumulated path list
/// independently of whether their parent survives. A collection is removed
/// only when its `read` flag is explicitly `false`; an unspecified flag
/// allows reading. Every returned collection carries a fixed descriptor.
pub fn resolve_collections_permissions(
    collections: Vec<Collection>,
    user: Option<&User>,
    resolver: &dyn PermissionResolver,
    paths: &[String],
) -> Vec<Collection> {
    collections
        .into_iter()
        .filter_map(|mut collection| {
            let mut segments = paths.to_vec();
            segments.push(collection.path.clone());

            let permissions = resolver.resolve(&collection, user, &segments);

            collection.subcollections = collection
                .subcollections
                .take()
                .map(|subs| resolve_collections_permissions(subs, user, resolver, &segments));
            collection.permissions = Some(PermissionsSpec::Fixed(permissions));

            if permissions.read == Some(false) {
                debug!(path = %segments.join("/"), "collection hidden: read denied");
                return None;
            }
            Some(collection)
        })
        .collect()
}

/// Capability checks for one user.
///
/// Each check combines the resolved flag with the collection's own
/// `editable`/`deletable` flag:
///
/// 1. an explicit `false` on the collection always denies;
/// 2. otherwise the resolved flag decides when it is specified;
/// 3. otherwise the collection flag decides, then the default (allowed).
///
/// Deletion is also denied structurally for collections nested deeper than
/// `max_deletable_depth`.
#[derive(Clone, Copy)]
pub struct AccessContext<'a> {
    pub user: Option<&'a User>,
    pub resolver: &'a dyn PermissionResolver,
    pub max_deletable_depth: Option<usize>,
}

impl<'a> AccessContext<'a> {
    pub fn new(user: Option<&'a User>, resolver: &'a dyn PermissionResolver) -> Self {
        Self {
            user,
            resolver,
            max_deletable_depth: None,
        }
    }

    pub fn with_max_deletable_depth(mut self, depth: Option<usize>) -> Self {
        self.max_deletable_depth = depth;
        self
    }

    pub fn permissions(&self, collection: &Collection, path_segments: &[String]) -> Permissions {
        self.resolver.resolve(collection, self.user, path_segments)
    }

    pub fn can_read_collection(&self, collection: &Collection, path_segments: &[String]) -> bool {
        self.permissions(collection, path_segments).read != Some(false)
    }

    pub fn can_edit_collection(&self, collection: &Collection, path_segments: &[String]) -> bool {
        let granted = self.permissions(collection, path_segments).edit;
        capability(collection.editable, granted)
    }

    pub fn can_create_in_collection(
        &self,
        collection: &Collection,
        path_segments: &[String],
    ) -> bool {
        let granted = self.permissions(collection, path_segments).create;
        capability(None, granted)
    }

    pub fn can_delete_collection(&self, collection: &Collection, path_segments: &[String]) -> bool {
        let depth = path_segments.len().saturating_sub(1);
        if self.max_deletable_depth.is_some_and(|max| depth > max) {
            return false;
        }
        let granted = self.permissions(collection, path_segments).delete;
        capability(collection.deletable, granted)
    }
}

fn capability(collection_flag: Option<bool>, granted: Option<bool>) -> bool {
    if collection_flag == Some(false) {
        return false;
    }
    granted.or(collection_flag).unwrap_or(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn segments(path: &str) -> Vec<String> {
        path.split('/').map(str::to_string).collect()
    }

    fn editor_table() -> BTreeMap<String, Permissions> {
        let mut roles = BTreeMap::new();
        roles.insert("admin".to_string(), Permissions::ALL);
        roles.insert("viewer".to_string(), Permissions::READ_ONLY);
        roles.insert(
            "editor".to_string(),
            Permissions {
                read: Some(true),
                edit: Some(true),
                ..Default::default()
            },
        );
        roles
    }

    #[test]
    fn role_grants_win_over_denials() {
        let user = User::new("u1").role("viewer").role("editor");
        let p = resolve_role_permissions(&editor_table(), Some(&user));
        assert_eq!(p.read, Some(true));
        assert_eq!(p.edit, Some(true));
        assert_eq!(p.create, Some(false));
        assert_eq!(p.delete, Some(false));
    }

    #[test]
    fn unspecified_flags_stay_unspecified() {
        let user = User::new("u1").role("editor");
        let p = resolve_role_permissions(&editor_table(), Some(&user));
        assert_eq!(p.create, None);
    }

    #[test]
    fn unknown_roles_and_anonymous_get_nothing() {
        let stranger = User::new("u2").role("guest");
        assert_eq!(
            resolve_role_permissions(&editor_table(), Some(&stranger)),
            Permissions::NONE
        );
        assert_eq!(
            resolve_role_permissions(&editor_table(), None),
            Permissions::NONE
        );
    }

    #[test]
    fn unreadable_collections_are_removed() {
        let collections = vec![
            Collection::new("public", "Public"),
            Collection::new("secret", "Secret").permissions(Permissions::NONE),
        ];

        let resolved =
            resolve_collections_permissions(collections, None, &DefaultPermissionResolver, &[]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].path, "public");
        assert_eq!(
            resolved[0].permissions,
            Some(PermissionsSpec::Fixed(Permissions::default()))
        );
    }

    #[test]
    fn subcollections_filtered_with_accumulated_paths() {
        let collections = vec![
            Collection::new("products", "Products")
                .subcollection(Collection::new("locales", "Locales"))
                .subcollection(Collection::new("costs", "Costs")),
        ];
        let resolver = |c: &Collection, _: Option<&User>, paths: &[String]| {
            if paths == ["products".to_string(), "costs".to_string()] {
                assert_eq!(c.path, "costs");
                Permissions::NONE
            } else {
                Permissions::default()
            }
        };

        let resolved = resolve_collections_permissions(collections, None, &resolver, &[]);
        let subs = resolved[0].subcollections.as_ref().unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].path, "locales");
        assert!(subs[0].permissions.is_some());
    }

    #[test]
    fn edit_falls_back_to_collection_flag() {
        let resolver = DefaultPermissionResolver;
        let access = AccessContext::new(None, &resolver);

        let plain = Collection::new("a", "A");
        assert!(access.can_edit_collection(&plain, &segments("a")));

        let locked = Collection::new("a", "A").editable(false).permissions(Permissions::ALL);
        assert!(!access.can_edit_collection(&locked, &segments("a")));

        let denied = Collection::new("a", "A").editable(true).permissions(Permissions::READ_ONLY);
        assert!(!access.can_edit_collection(&denied, &segments("a")));
    }

    #[test]
    fn declared_collections_are_never_deletable() {
        let resolver = DefaultPermissionResolver;
        let access = AccessContext::new(None, &resolver);
        let c = Collection::new("a", "A").deletable(false).permissions(Permissions::ALL);
        assert!(!access.can_delete_collection(&c, &segments("a")));
    }

    #[test]
    fn deletion_limited_by_depth() {
        let resolver = DefaultPermissionResolver;
        let access = AccessContext::new(None, &resolver).with_max_deletable_depth(Some(0));
        let c = Collection::new("locales", "Locales").deletable(true);

        assert!(access.can_delete_collection(&c, &segments("locales")));
        assert!(!access.can_delete_collection(&c, &segments("products/locales")));
    }

    #[test]
    fn create_follows_resolved_flag() {
        let resolver = DefaultPermissionResolver;
        let access = AccessContext::new(None, &resolver);
        let c = Collection::new("a", "A").permissions(Permissions::READ_ONLY);
        assert!(!access.can_create_in_collection(&c, &segments("a")));
        assert!(access.can_create_in_collection(&Collection::new("a", "A"), &segments("a")));
        assert!(access.can_read_collection(&c, &segments("a")));
    }
}

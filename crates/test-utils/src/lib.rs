//! Folio test utilities.
//!
//! Fixtures for collections, views and users, plus assertion helpers for
//! navigation testing.

use folio_sdk::types::{Collection, DataType, Permissions, PermissionsSpec, Property, User, View};

/// Create a test collection with a name and nothing else.
pub fn test_collection(path: &str, name: &str) -> TestCollection {
    TestCollection {
        collection: Collection::new(path, name),
    }
}

/// A collection builder for test fixtures.
#[derive(Debug, Clone)]
pub struct TestCollection {
    collection: Collection,
}

impl TestCollection {
    pub fn in_group(mut self, group: &str) -> Self {
        self.collection.group = Some(group.to_string());
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.collection.alias = Some(alias.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.collection.description = Some(description.to_string());
        self
    }

    /// Add a plain string property.
    pub fn with_text_property(mut self, key: &str) -> Self {
        self.collection
            .properties
            .insert(key.to_string(), Property::new(DataType::String).name(key));
        self
    }

    pub fn with_subcollection(mut self, child: TestCollection) -> Self {
        self.collection = self.collection.subcollection(child.build());
        self
    }

    /// Same permissions for every user.
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.collection.permissions = Some(PermissionsSpec::Fixed(permissions));
        self
    }

    /// Grant `permissions` to holders of `role`.
    pub fn with_role(mut self, role: &str, permissions: Permissions) -> Self {
        match &mut self.collection.permissions {
            Some(PermissionsSpec::ByRole { roles }) => {
                roles.insert(role.to_string(), permissions);
            }
            _ => {
                self.collection.permissions = Some(PermissionsSpec::ByRole {
                    roles: [(role.to_string(), permissions)].into_iter().collect(),
                });
            }
        }
        self
    }

    /// Mark as read only for everyone.
    pub fn read_only(self) -> Self {
        self.with_permissions(Permissions::READ_ONLY)
    }

    pub fn build(self) -> Collection {
        self.collection
    }
}

impl From<TestCollection> for Collection {
    fn from(value: TestCollection) -> Self {
        value.build()
    }
}

/// Create a visible test view.
pub fn test_view(path: &str, name: &str) -> View {
    View::new(path, name)
}

/// Create a test user with the given roles.
pub fn test_user(uid: &str, roles: &[&str]) -> User {
    roles
        .iter()
        .fold(User::new(uid), |user, role| user.role(*role))
}

/// Create an admin test user.
pub fn admin_user() -> User {
    test_user("admin", &["admin"])
}

/// Create an editor test user.
pub fn editor_user() -> User {
    test_user("editor", &["editor"])
}

/// Stock catalog fixtures shared by navigation tests.
pub mod catalog {
    use folio_sdk::types::{Collection, View};

    use super::{test_collection, test_view};

    /// Declared collections: `products` in the Sales group.
    pub fn declared() -> Vec<Collection> {
        vec![
            test_collection("products", "Products")
                .in_group("Sales")
                .with_text_property("name")
                .build(),
        ]
    }

    /// Persisted collections: an override of `products` plus a new `orders`
    /// collection in the Ops group.
    pub fn persisted() -> Vec<Collection> {
        vec![
            test_collection("products", "Products v2")
                .in_group("Sales")
                .build(),
            test_collection("orders", "Orders").in_group("Ops").build(),
        ]
    }

    pub fn views() -> Vec<View> {
        vec![test_view("dashboard", "Dashboard").group("Ops")]
    }
}

/// Assertion helpers for collections and JSON output.
pub mod assert {
    use folio_sdk::types::Collection;
    use serde_json::Value;

    /// Assert the top-level collection paths, in order.
    pub fn collection_paths(collections: &[Collection], expected: &[&str]) {
        let actual: Vec<&str> = collections.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(actual, expected, "collection paths differ");
    }

    /// Find a top-level collection by path, failing the test if absent.
    pub fn find<'a>(collections: &'a [Collection], path: &str) -> &'a Collection {
        match collections.iter().find(|c| c.path == path) {
            Some(collection) => collection,
            None => panic!("Expected collection '{path}' in {collections:?}"),
        }
    }

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}

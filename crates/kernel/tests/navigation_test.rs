#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Navigation resolution tests.
//!
//! Drive [`NavigationResolver`] and [`NavigationContext`] end to end over the
//! stock catalog: join, permission filtering, top navigation and lookup.

mod common;

use std::sync::Arc;

use folio_kernel::navigation::paths::{decode_path, encode_path};
use folio_kernel::navigation::{EntryType, NavigationController, NavigationResolver};
use folio_kernel::persistence::{
    MemoryConfigPersistence, MemoryUserConfigPersistence, UserConfigurationPersistence,
};
use folio_kernel::{NavigationConfig, NavigationError};
use folio_sdk::types::{CollectionPatch, Permissions};
use folio_test_utils::{assert, catalog, editor_user, test_collection, test_user, test_view};

#[test]
fn persisted_override_wins_and_declared_stays_undeletable() {
    let model = NavigationResolver::new(&common::config()).resolve(
        &catalog::declared(),
        Some(&catalog::persisted()),
        &catalog::views(),
        None,
    );

    assert::collection_paths(&model.collections, &["products", "orders"]);

    let products = assert::find(&model.collections, "products");
    assert_eq!(products.name, "Products v2");
    assert_eq!(products.deletable, Some(false));
    assert!(products.properties.contains_key("name"));

    let orders = assert::find(&model.collections, "orders");
    assert_eq!(orders.editable, Some(true));
    assert_eq!(orders.deletable, Some(true));

    let entries = &model.top_level_navigation.navigation_entries;
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].url, "/c/products");
    assert!(!entries[0].deletable);
    assert!(entries[0].editable);

    assert_eq!(entries[1].url, "/c/orders");
    assert!(entries[1].deletable);
    assert!(entries[1].editable);

    assert_eq!(entries[2].entry_type, EntryType::View);
    assert_eq!(entries[2].url, "/dashboard");
    assert!(!entries[2].deletable);

    assert_eq!(model.top_level_navigation.groups, vec!["Sales", "Ops"]);
}

#[test]
fn declared_collections_are_undeletable_without_persistence() {
    let model =
        NavigationResolver::new(&common::config()).resolve(&catalog::declared(), None, &[], None);

    assert_eq!(model.collections.len(), 1);
    assert_eq!(model.collections[0].deletable, Some(false));
    assert!(!model.top_level_navigation.navigation_entries[0].deletable);
}

#[test]
fn resolution_is_deterministic() {
    let resolver = NavigationResolver::new(&common::config());
    let user = editor_user();
    let resolve = || {
        resolver.resolve(
            &catalog::declared(),
            Some(&catalog::persisted()),
            &catalog::views(),
            Some(&user),
        )
    };
    assert_eq!(resolve(), resolve());
}

#[test]
fn read_denied_collections_never_reach_navigation() {
    let resolver = NavigationResolver::new(&common::config())
        .with_permission_resolver(common::path_resolver(&[("orders", Permissions::NONE)]));

    let model = resolver.resolve(
        &catalog::declared(),
        Some(&catalog::persisted()),
        &catalog::views(),
        None,
    );

    assert::collection_paths(&model.collections, &["products"]);
    assert!(
        model
            .top_level_navigation
            .navigation_entries
            .iter()
            .all(|e| e.path != "orders")
    );
    // Ops survives through the dashboard view.
    assert_eq!(model.top_level_navigation.groups, vec!["Sales", "Ops"]);
}

#[test]
fn nested_read_denial_uses_joined_segments() {
    let declared = vec![
        test_collection("products", "Products")
            .with_subcollection(test_collection("locales", "Locales"))
            .with_subcollection(test_collection("prices", "Prices"))
            .build(),
    ];
    let resolver = NavigationResolver::new(&common::config()).with_permission_resolver(
        common::path_resolver(&[("products/locales", Permissions::NONE)]),
    );

    let model = resolver.resolve(&declared, None, &[], None);
    let subcollections = model.collections[0].subcollections.as_ref().unwrap();
    assert::collection_paths(subcollections, &["prices"]);
}

#[test]
fn role_tables_follow_the_user() {
    let declared = vec![
        test_collection("products", "Products").build(),
        test_collection("audit", "Audit")
            .in_group("Admin")
            .with_role("admin", Permissions::ALL)
            .with_role("auditor", Permissions::READ_ONLY)
            .build(),
    ];
    let resolver = NavigationResolver::new(&common::config());

    let guest = resolver.resolve(&declared, None, &[], Some(&test_user("guest", &[])));
    assert::collection_paths(&guest.collections, &["products"]);

    let auditor = resolver.resolve(&declared, None, &[], Some(&test_user("a", &["auditor"])));
    assert::collection_paths(&auditor.collections, &["products", "audit"]);
    let audit_entry = &auditor.top_level_navigation.navigation_entries[1];
    assert!(!audit_entry.editable);
    assert!(!audit_entry.deletable);
}

#[test]
fn hidden_views_are_left_out() {
    let views = vec![
        test_view("dashboard", "Dashboard"),
        test_view("debug", "Debug").hidden(),
    ];
    let model = NavigationResolver::new(&common::config()).resolve(&[], None, &views, None);

    let names: Vec<&str> = model
        .top_level_navigation
        .navigation_entries
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["Dashboard"]);
}

#[test]
fn urls_respect_base_path() {
    let config = NavigationConfig {
        base_path: "/admin/".into(),
        base_collection_path: "data".into(),
        ..NavigationConfig::default()
    };
    let declared = vec![
        test_collection("products", "Products")
            .with_alias("catalogue")
            .build(),
    ];
    let model = NavigationResolver::new(&config).resolve(&declared, None, &catalog::views(), None);

    let urls: Vec<&str> = model
        .top_level_navigation
        .navigation_entries
        .iter()
        .map(|e| e.url.as_str())
        .collect();
    assert_eq!(urls, vec!["/admin/data/catalogue", "/admin/dashboard"]);
}

#[test]
fn context_resolves_aliases_and_data_paths() {
    let declared = vec![
        test_collection("products", "Products")
            .with_alias("p")
            .with_subcollection(test_collection("locales", "Locales").with_alias("l"))
            .build(),
    ];
    let controller = NavigationController::builder(&common::config())
        .collections(declared)
        .build();

    assert!(matches!(
        controller.context().resolve_aliases_from("p"),
        Err(NavigationError::NotInitialised)
    ));

    controller.refresh(None);
    let context = controller.context();

    assert_eq!(context.resolve_aliases_from("p/42/l").unwrap(), "products/42/locales");
    assert_eq!(context.url_path_to_data_path("/c/p/42").unwrap(), "p/42");
    assert!(matches!(
        context.url_path_to_data_path("/elsewhere/p"),
        Err(NavigationError::PathOutsideBase { .. })
    ));
    assert!(context.is_url_collection_path("/c/products"));
    assert!(!context.is_url_collection_path("/dashboard"));
}

#[test]
fn lookup_applies_user_then_handler_overrides() {
    let user_config = Arc::new(MemoryUserConfigPersistence::new());
    user_config.set_collection_config(
        "products",
        CollectionPatch {
            group: Some("Mine".into()),
            description: Some("user description".into()),
            ..Default::default()
        },
    );

    let controller = NavigationController::builder(&common::config())
        .collections(catalog::declared())
        .config_persistence(Arc::new(MemoryConfigPersistence::new(catalog::persisted())))
        .user_config_persistence(user_config)
        .override_handler(Arc::new(|path: &str, entity_id: Option<&str>| {
            (path == "products" && entity_id == Some("42")).then(|| CollectionPatch {
                description: Some("handler description".into()),
                ..Default::default()
            })
        }))
        .build();
    controller.refresh(None);
    let context = controller.context();

    let plain = context.get_collection("products", None, false).unwrap();
    assert_eq!(plain.group.as_deref(), Some("Sales"));
    assert_eq!(plain.name, "Products v2");

    let personal = context.get_collection("/products/", None, true).unwrap();
    assert_eq!(personal.group.as_deref(), Some("Mine"));
    assert_eq!(personal.description.as_deref(), Some("user description"));

    let entity = context.get_collection("products", Some("42"), true).unwrap();
    assert_eq!(entity.group.as_deref(), Some("Mine"));
    assert_eq!(entity.description.as_deref(), Some("handler description"));

    assert!(context.get_collection("unknown", None, true).is_none());
}

#[test]
fn creation_policy_sees_user_and_group() {
    let controller = NavigationController::builder(&common::config())
        .collections(catalog::declared())
        .creation_policy(Arc::new(
            |user: Option<&folio_sdk::types::User>, group: Option<&str>| {
                user.is_some_and(|u| u.has_role("editor")) && group != Some("Locked")
            },
        ))
        .build();

    controller.refresh(Some(&editor_user()));
    let context = controller.context();
    assert!(context.can_create_collections(None));
    assert!(context.can_create_collections(Some("Sales")));
    assert!(!context.can_create_collections(Some("Locked")));

    controller.refresh(Some(&test_user("guest", &[])));
    assert!(!controller.context().can_create_collections(None));
}

#[test]
fn encoded_paths_decode_back() {
    for path in ["products", "products/42/locales", "space here/#tag", "ünïcode"] {
        let encoded = encode_path(path);
        assert!(!encoded.contains(' '));
        assert_eq!(decode_path(&encoded).unwrap(), path);
    }
    assert!(matches!(
        decode_path("%FF%FE"),
        Err(NavigationError::MalformedPath { .. })
    ));
}

#[test]
fn navigation_serializes_for_the_cli() {
    let model = NavigationResolver::new(&common::config()).resolve(
        &catalog::declared(),
        Some(&catalog::persisted()),
        &catalog::views(),
        None,
    );
    let json = serde_json::to_value(&model.top_level_navigation).unwrap();

    assert::has_key(&json, "navigation_entries");
    assert::has_key(&json, "groups");
    let first = &json["navigation_entries"][0];
    assert::has_key(first, "type");
    assert_eq!(first["type"], "collection");
    assert_eq!(json["navigation_entries"][2]["type"], "view");
    assert!(first.get("description").is_none());
}

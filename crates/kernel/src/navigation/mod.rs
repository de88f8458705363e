//! Navigation resolution.
//!
//! Declared collections (from the host) and persisted collections (from a
//! [`ConfigurationPersistence`](crate::persistence::ConfigurationPersistence))
//! are joined, filtered by read permission for the current user and
//! flattened into top-level navigation entries grouped by category.

mod context;
mod controller;
mod join;
mod lookup;
pub mod paths;
mod resolver;
mod top;
mod urls;

pub use context::{
    CollectionCreationPolicy, CollectionOverrideHandler, LookupServices, NavigationContext,
};
pub use controller::{NavigationController, NavigationControllerBuilder, RefreshTicket};
pub use join::join_collections;
pub use lookup::{get_collection_by_path, resolve_collection_aliases};
pub use resolver::{NavigationModel, NavigationResolver};
pub use top::{
    EntryType, NavigationEntry, TopNavigationResult, collect_groups, compute_top_navigation,
};
pub use urls::NavigationUrls;

//! Folio Kernel Library
//!
//! Resolves the navigation model of a headless admin interface: declared
//! collections are joined with persisted ones, filtered by the current
//! user's permissions and flattened into grouped navigation entries.
//! The `folio` binary wraps the library for inspection from the shell.

pub mod config;
pub mod error;
pub mod navigation;
pub mod permissions;
pub mod persistence;

pub use config::NavigationConfig;
pub use error::{NavigationError, NavigationResult};
pub use navigation::{NavigationContext, NavigationController, NavigationResolver};

//! Folio SDK
//!
//! Data model shared between the navigation kernel and host applications:
//! collections, views, users and permission descriptors. Every type is
//! serde (de)serializable so hosts can declare collections in YAML or JSON.

pub mod merge;
pub mod types;

pub use merge::Merge;

pub mod prelude {
    pub use crate::merge::Merge;
    pub use crate::types::*;
}

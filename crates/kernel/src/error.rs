//! Navigation error types.

use thiserror::Error;

/// Errors raised by the navigation kernel.
///
/// `NotInitialised`, `PathOutsideBase` and `MalformedPath` are caller
/// contract violations and are never retried. Persistence failures during a
/// refresh are not returned through this type; they are recorded on the
/// navigation context instead.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("collections have not been initialised yet")]
    NotInitialised,

    #[error("expected path starting with {expected}: {path}")]
    PathOutsideBase { expected: String, path: String },

    #[error("collection paths must have an odd number of segments: {path}")]
    InvalidCollectionPath { path: String },

    #[error("malformed percent-encoding in path: {path}")]
    MalformedPath { path: String },

    #[error("collection not found: {path}")]
    CollectionNotFound { path: String },

    #[error("collection cannot be deleted: {path}")]
    NotDeletable { path: String },

    #[error("collection cannot be saved: {path}")]
    NotEditable { path: String },

    #[error("persistence error")]
    Persistence(#[from] anyhow::Error),
}

/// Result type alias using NavigationError.
pub type NavigationResult<T> = Result<T, NavigationError>;

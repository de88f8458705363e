//! Merging declared collections with persisted ones.

use std::collections::HashSet;

use folio_sdk::Merge;
use folio_sdk::types::Collection;
use tracing::debug;

/// Merge persisted collections into the declared list.
///
/// - Persisted collections are user managed: they are stamped
///   `editable = true, deletable = true`.
/// - A declared collection with a persisted counterpart (same `path`) is
///   deep-merged with it, persisted values winning.
/// - Every declared collection ends up `deletable = false`, whether or not a
///   persisted counterpart exists.
/// - Persisted collections without a declared counterpart are appended after
///   the declared ones, in their original order.
pub fn join_collections(persisted: &[Collection], declared: &[Collection]) -> Vec<Collection> {
    let stored: Vec<Collection> = persisted
        .iter()
        .cloned()
        .map(|c| Collection {
            editable: Some(true),
            deletable: Some(true),
            ..c
        })
        .collect();

    let mut joined: Vec<Collection> = declared
        .iter()
        .map(|declared| {
            let merged = match stored.iter().find(|s| s.path == declared.path) {
                Some(stored) => declared.clone().merge(stored.clone()),
                None => declared.clone(),
            };
            Collection {
                deletable: Some(false),
                ..merged
            }
        })
        .collect();

    let declared_paths: HashSet<&str> = declared.iter().map(|c| c.path.as_str()).collect();
    let before = joined.len();
    joined.extend(
        stored
            .into_iter()
            .filter(|c| !declared_paths.contains(c.path.as_str())),
    );

    debug!(
        declared = declared.len(),
        persisted = persisted.len(),
        persisted_only = joined.len() - before,
        "joined collections"
    );

    joined
}

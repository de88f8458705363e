//! String-only path helpers.
//!
//! Collection paths alternate between collection identifiers and entity ids:
//! `products/42/locales` is the `locales` subcollection of entity `42` in
//! `products`. A path that addresses a collection always has an odd number of
//! segments.

use crate::error::{NavigationError, NavigationResult};

/// Strip every leading and trailing "/".
pub fn remove_initial_and_trailing_slashes(path: &str) -> &str {
    path.trim_matches('/')
}

/// Collection identifiers of a full path (the segments at even positions).
///
/// `products/42/locales` yields `["products", "locales"]`.
pub fn full_path_to_collection_segments(path: &str) -> Vec<String> {
    remove_initial_and_trailing_slashes(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .step_by(2)
        .map(str::to_string)
        .collect()
}

/// Odd-length prefixes of a segmented path, longest first.
///
/// A trailing entity id (even segment count) is dropped before building the
/// prefixes, so every returned candidate addresses a collection.
pub fn collection_path_combinations(segments: &[&str]) -> Vec<String> {
    let entries = if !segments.is_empty() && segments.len() % 2 == 0 {
        &segments[..segments.len() - 1]
    } else {
        segments
    };

    (1..=entries.len())
        .rev()
        .step_by(2)
        .map(|len| entries[..len].join("/"))
        .collect()
}

/// Whether `path` addresses a collection (odd, non-zero segment count).
pub fn is_valid_collection_path(path: &str) -> bool {
    let clean = remove_initial_and_trailing_slashes(path);
    !clean.is_empty() && clean.split('/').count() % 2 == 1
}

/// Reject paths with an even number of segments.
pub fn validate_collection_path(path: &str) -> NavigationResult<()> {
    if is_valid_collection_path(path) {
        Ok(())
    } else {
        Err(NavigationError::InvalidCollectionPath {
            path: path.to_string(),
        })
    }
}

/// Percent-encode a path for use in a URL.
///
/// "/" and "#" are path delimiters here, not payload, so they stay literal.
pub fn encode_path(path: &str) -> String {
    urlencoding::encode(remove_initial_and_trailing_slashes(path))
        .replace("%2F", "/")
        .replace("%23", "#")
}

/// Inverse of [`encode_path`].
pub fn decode_path(path: &str) -> NavigationResult<String> {
    urlencoding::decode(path)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| NavigationError::MalformedPath {
            path: path.to_string(),
        })
}

/// Key identifying a side panel for a collection or one of its entities.
pub fn side_panel_key(path: &str, entity_id: Option<&str>) -> String {
    let path = remove_initial_and_trailing_slashes(path);
    match entity_id {
        Some(id) => format!("{path}/{}", remove_initial_and_trailing_slashes(id)),
        None => path.to_string(),
    }
}

//! Locating collections by path or alias.

use folio_sdk::types::Collection;

use super::paths::{collection_path_combinations, remove_initial_and_trailing_slashes};

fn matches(collection: &Collection, candidate: &str) -> bool {
    collection.path == candidate || collection.alias.as_deref() == Some(candidate)
}

/// Find the collection addressed by `path`, descending into subcollections.
///
/// Each level of `path` may use either the collection's path or its alias.
/// Paths with an even number of segments address an entity, not a
/// collection, and yield `None`.
pub fn get_collection_by_path<'a>(
    path: &str,
    collections: &'a [Collection],
) -> Option<&'a Collection> {
    let clean = remove_initial_and_trailing_slashes(path);
    let segments: Vec<&str> = clean.split('/').collect();

    for candidate in collection_path_combinations(&segments) {
        let Some(found) = collections.iter().find(|c| matches(c, &candidate)) else {
            continue;
        };

        if candidate == clean {
            return Some(found);
        }

        // The remainder is `{entity_id}/{subcollection path...}`.
        let consumed = candidate.split('/').count();
        let rest = &segments[consumed..];
        if rest.len() > 1
            && let Some(subcollections) = &found.subcollections
            && let Some(sub) = get_collection_by_path(&rest[1..].join("/"), subcollections)
        {
            return Some(sub);
        }
    }

    None
}

/// Replace aliases in `path` with the collection paths they stand for.
///
/// Entity ids are kept as they are. Unknown segments are left untouched.
pub fn resolve_collection_aliases(path: &str, collections: &[Collection]) -> String {
    let clean = remove_initial_and_trailing_slashes(path);
    let segments: Vec<&str> = clean.split('/').collect();

    for candidate in collection_path_combinations(&segments) {
        let Some(found) = collections.iter().find(|c| matches(c, &candidate)) else {
            continue;
        };

        let consumed = candidate.split('/').count();
        return match &segments[consumed..] {
            [] => found.path.clone(),
            [entity_id] => format!("{}/{entity_id}", found.path),
            [entity_id, rest @ ..] => {
                let rest = rest.join("/");
                let resolved = match &found.subcollections {
                    Some(subcollections) => resolve_collection_aliases(&rest, subcollections),
                    None => rest,
                };
                format!("{}/{entity_id}/{resolved}", found.path)
            }
        };
    }

    clean.to_string()
}

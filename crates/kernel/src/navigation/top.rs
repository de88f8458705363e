//! Top-level navigation entries.

use std::collections::HashSet;

use folio_sdk::types::{Collection, View};
use serde::{Deserialize, Serialize};

use super::paths::full_path_to_collection_segments;
use super::urls::NavigationUrls;
use crate::permissions::AccessContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Collection,
    View,
}

/// A resolved entry of the top navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub url: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub name: String,
    /// Alias-or-path for collections, canonical path for views.
    pub path: String,
    pub deletable: bool,
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopNavigationResult {
    pub navigation_entries: Vec<NavigationEntry>,
    /// Distinct non-empty groups, in order of first appearance.
    pub groups: Vec<String>,
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Build one entry per collection and one per visible view.
pub fn compute_top_navigation(
    collections: &[Collection],
    views: &[View],
    urls: &NavigationUrls,
    access: &AccessContext<'_>,
) -> TopNavigationResult {
    let collection_entries = collections.iter().map(|collection| {
        let segments = full_path_to_collection_segments(&collection.path);
        let path = collection.alias_or_path().to_string();
        NavigationEntry {
            url: urls.build_url_collection_path(&path),
            entry_type: EntryType::Collection,
            name: collection.name.clone(),
            path,
            deletable: access.can_delete_collection(collection, &segments),
            editable: access.can_edit_collection(collection, &segments),
            description: trimmed(collection.description.as_ref()),
            group: trimmed(collection.group.as_ref()),
        }
    });

    let view_entries = views
        .iter()
        .filter(|view| !view.hide_from_navigation)
        .map(|view| {
            let path = view.path.canonical().to_string();
            NavigationEntry {
                url: urls.build_cms_url_path(&path),
                entry_type: EntryType::View,
                name: view.name.clone(),
                path,
                deletable: false,
                editable: false,
                description: trimmed(view.description.as_ref()),
                group: trimmed(view.group.as_ref()),
            }
        });

    let navigation_entries: Vec<NavigationEntry> = collection_entries.chain(view_entries).collect();
    let groups = collect_groups(&navigation_entries);

    TopNavigationResult {
        navigation_entries,
        groups,
    }
}

/// Distinct non-empty groups in order of first appearance.
pub fn collect_groups(entries: &[NavigationEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(|e| e.group.as_deref())
        .filter(|g| !g.is_empty() && seen.insert(*g))
        .map(str::to_string)
        .collect()
}

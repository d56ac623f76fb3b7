//! Content-keyed set operations over vulnerability lists.

use super::model::VulnerabilityItem;
use std::collections::{BTreeMap, HashSet};

/// Appends `item` unless an item with the same `content` is already present.
///
/// Items whose content is blank are never stored. Returns `true` when the
/// list changed.
pub fn add(list: &mut Vec<VulnerabilityItem>, item: VulnerabilityItem) -> bool {
    if item.content.trim().is_empty() {
        return false;
    }
    if list.iter().any(|existing| existing.content == item.content) {
        return false;
    }
    list.push(item);
    true
}

/// Computes `(removed, added)` between two snapshots, keyed by `content`.
///
/// `removed` keeps the order of `before`, `added` keeps the order of `after`.
pub fn diff(
    before: &[VulnerabilityItem],
    after: &[VulnerabilityItem],
) -> (Vec<VulnerabilityItem>, Vec<VulnerabilityItem>) {
    let before_keys: HashSet<&str> = before.iter().map(|item| item.content.as_str()).collect();
    let after_keys: HashSet<&str> = after.iter().map(|item| item.content.as_str()).collect();

    let removed = before
        .iter()
        .filter(|item| !after_keys.contains(item.content.as_str()))
        .cloned()
        .collect();
    let added = after
        .iter()
        .filter(|item| !before_keys.contains(item.content.as_str()))
        .cloned()
        .collect();

    (removed, added)
}

/// Counts how often each category index occurs across `items`.
///
/// Items without categories contribute nothing.
pub fn count_by_category(items: &[VulnerabilityItem]) -> BTreeMap<u32, u32> {
    let mut counts = BTreeMap::new();
    for index in items.iter().flat_map(|item| item.category_indices.iter()) {
        *counts.entry(*index).or_insert(0) += 1;
    }
    counts
}

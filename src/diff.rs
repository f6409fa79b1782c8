// src/diff.rs
use crate::ingest::types::PublishedItem;
use crate::state::KnownSet;

/// Items of `current` not yet in `known`, in `current`'s order.
pub fn diff(current: &[PublishedItem], known: &KnownSet) -> Vec<PublishedItem> {
    current
        .iter()
        .filter(|it| !known.contains(&it.identifier))
        .cloned()
        .collect()
}

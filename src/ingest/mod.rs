// src/ingest/mod.rs
pub mod dimes;
pub mod providers;
pub mod types;

use crate::ingest::types::PublishedItem;
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// Normalize a record title: decode entities, strip inline markup, collapse whitespace.
///
/// ArchivesSpace titles routinely carry EAD inline tags such as
/// `<title render="italic">`, which have no place in a chat message.
pub fn normalize_title(s: &str) -> String {
    // 1) Strip tags first so encoded brackets (&lt;) survive as literal text
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z][^>]*>").unwrap());
    let out = re_tags.replace_all(s, "");

    // 2) HTML entity decode
    let out = html_escape::decode_html_entities(&out).to_string();

    // 3) Normalize “ ” ‘ ’ to ASCII quotes
    let out = out
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (nbsp included)
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"[\s\u{00A0}]+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Drop repeated identifiers, keeping the first occurrence and the original order.
/// Returns the kept items and how many were dropped.
pub fn dedup_by_identifier(items: Vec<PublishedItem>) -> (Vec<PublishedItem>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut keep = Vec::with_capacity(items.len());
    let mut dropped = 0usize;
    for it in items {
        if !seen.insert(it.identifier.clone()) {
            dropped += 1;
            continue;
        }
        keep.push(it);
    }
    (keep, dropped)
}

//! Field-level cleanup rules
//!
//! Ports of the catalog's dirty-data conventions: quoted words inside
//! titles, en-dashes, inconsistent phone separators, author lists with
//! stray whitespace, zero/blank years and publishers.

use once_cell::sync::Lazy;
use regex::Regex;
use salesdash_common::text::collapse_whitespace;
use std::collections::HashMap;

static QUOTED_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"'(\w+)'").unwrap());
static PHONE_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\)\.\s+]").unwrap());
static PHONE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+)--").unwrap());

/// Clean a book title: strip inner `'word'` quoting, collapse doubled
/// quotes, normalize en-dash to hyphen
pub fn clean_title(raw: &str) -> String {
    let s = QUOTED_WORD_RE.replace_all(raw, "$1");
    let s = s.replace("''", "'").replace('–', "-");
    collapse_whitespace(&s)
}

/// Standardize phone separators to `-`
pub fn standardize_phone(raw: &str) -> String {
    let s = PHONE_SEPARATOR_RE.replace_all(raw.trim(), "-");
    PHONE_PREFIX_RE.replace_all(&s, "${1}-").into_owned()
}

/// Split a comma-separated author list into collapsed display names
pub fn split_authors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(collapse_whitespace)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Median of the valid publication years in a source's catalog; used to
/// backfill missing/zero years
pub fn median_year(years: &[i32]) -> Option<i32> {
    if years.is_empty() {
        return None;
    }
    let mut sorted = years.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2)
    }
}

/// Most frequent publisher in a source's catalog; used to backfill blank
/// publishers. Ties go to the lexicographically smallest name so the
/// result is deterministic.
pub fn mode_publisher(publishers: &[String]) -> Option<String> {
    if publishers.is_empty() {
        return None;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for publisher in publishers {
        *counts.entry(publisher.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(a_name, a_count), (b_name, b_count)| {
            a_count.cmp(b_count).then(b_name.cmp(a_name))
        })
        .map(|(name, _)| name.to_string())
}

//! Text normalization helpers
//!
//! Display forms keep the source's spelling (with whitespace collapsed);
//! comparison keys are the lowercase forms the identity resolver matches on.

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase, whitespace-collapsed comparison key.
///
/// Returns `None` when the value is empty after cleanup, so blank fields
/// never corroborate a match.
pub fn comparison_key(s: &str) -> Option<String> {
    let cleaned = collapse_whitespace(s).to_lowercase();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Option-friendly variant of [`comparison_key`]
pub fn optional_key(s: Option<&str>) -> Option<String> {
    s.and_then(comparison_key)
}

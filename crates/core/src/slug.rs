//! Slug grammar shared by every user-supplied identifier.
//!
//! Project slugs, entity keys and values, collection keys and values, and
//! job names all must match the same pattern before they reach the store.

use std::sync::LazyLock;

use regex::Regex;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z\-_:.]{1,260}$").expect("slug regex is valid"));

/// Returns `true` iff `s` matches `^[0-9A-Za-z\-_:.]{1,260}$`.
pub fn is_valid_slug(s: &str) -> bool {
    SLUG_RE.is_match(s)
}

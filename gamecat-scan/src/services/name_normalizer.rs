//! Folder name normalization
//!
//! Turns a raw folder name such as `Some Game [RePack]-FOO` into a
//! searchable title (`Some Game`). Rules, applied in order:
//! 1. every `[...]` annotation is removed
//! 2. hyphen-only tokens (` - ` separators) are removed
//! 3. trailing `-GROUP` release tags (a token starting with `-`) are removed
//! 4. whitespace runs collapse to single spaces, ends are trimmed
//!
//! Hyphens inside words (`Half-Life`) are kept. The result is idempotent:
//! normalizing a normalized name returns it unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

static BRACKETED: Lazy<Regex> = Lazy::new(|| {
    // Safe: constant pattern
    Regex::new(r"\[[^\]]*\]").expect("bracket pattern is valid")
});

/// Normalize a raw folder name into a search string
///
/// Returns `None` when nothing searchable remains (the whole name was
/// decorative metadata); the pipeline treats that as a skip.
pub fn normalize_name(raw: &str) -> Option<String> {
    let without_tags = BRACKETED.replace_all(raw, " ");

    let mut tokens: Vec<&str> = without_tags
        .split_whitespace()
        .filter(|token| !token.chars().all(|c| c == '-'))
        .collect();

    while tokens.last().is_some_and(|token| token.starts_with('-')) {
        tokens.pop();
    }

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

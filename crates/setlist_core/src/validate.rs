use std::sync::LazyLock;

use regex::Regex;

/// ASCII-only case folding: with Unicode folding `ſ` and the Kelvin sign would match `s` and `k`.
static SETLIST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i-u)^https?://(www\.)?setlist\.fm/setlist/[0-9a-z_+\-]+/[0-9]+/[0-9a-z_+\-]+\.html$",
    )
    .expect("setlist url pattern compiles")
});

/// Returns true when `candidate` points at a single setlist page on setlist.fm.
///
/// Scheme and host are matched case-insensitively. Surrounding whitespace is
/// not trimmed; the input box is expected to deliver the raw text.
pub fn is_valid_setlist_url(candidate: &str) -> bool {
    SETLIST_URL.is_match(candidate)
}

/// Why the current input cannot be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputHint {
    /// Not a setlist page URL.
    InvalidFormat,
    /// An "average setlist" page, which has no concrete song order to convert.
    AverageSetlist,
}

pub fn input_hint(candidate: &str) -> Option<InputHint> {
    if candidate.is_empty() || is_valid_setlist_url(candidate) {
        return None;
    }
    if candidate.contains("/average-setlist/") {
        Some(InputHint::AverageSetlist)
    } else {
        Some(InputHint::InvalidFormat)
    }
}

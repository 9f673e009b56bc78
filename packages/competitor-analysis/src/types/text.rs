//! Character-based truncation helpers.
//!
//! All limits in this crate count Unicode scalar values, not bytes, so a cut
//! never lands inside a code point.

/// Marker appended to summaries that were cut.
pub const ELLIPSIS: &str = "...";

/// Longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Shorten `text` to at most `cap` characters, marking the cut with `...`.
///
/// Text already within the cap is returned unchanged.
pub fn ellipsize(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        return text.to_string();
    }
    let keep = cap.saturating_sub(ELLIPSIS.len());
    format!("{}{}", truncate_chars(text, keep).trim_end(), ELLIPSIS)
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

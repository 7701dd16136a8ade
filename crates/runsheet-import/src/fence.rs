//! Markdown code fence stripping.
//!
//! Language models like to wrap JSON in a fenced block even when asked not
//! to. The opening fence (with an optional language tag) and the closing
//! fence are removed before decoding is attempted.

const FENCE: &str = "```";

/// Returns `raw` trimmed and without a surrounding markdown code fence.
pub(crate) fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.trim_end();
    rest.strip_suffix(FENCE).unwrap_or(rest).trim()
}

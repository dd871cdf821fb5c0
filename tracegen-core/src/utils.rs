//! Shared string helpers.

/// Strip one layer of matching `"` or `` ` `` quotes (e.g., `"fmt"` -> `fmt`).
pub fn unquote(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '`'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

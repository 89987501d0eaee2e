//! Diff preview of a formatting result.
//!
//! Uses the `similar` crate for line-by-line unified diffs.

use similar::TextDiff;

/// Unified diff from `original` to `formatted`, with `name` in both headers.
///
/// Empty when the texts are identical.
#[must_use]
pub fn unified_diff(name: &str, original: &str, formatted: &str) -> String {
    if original == formatted {
        return String::new();
    }
    TextDiff::from_lines(original, formatted)
        .unified_diff()
        .context_radius(3)
        .header(&format!("{name} (original)"), &format!("{name} (formatted)"))
        .to_string()
}

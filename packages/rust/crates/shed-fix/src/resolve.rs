//! Overlap resolution for a single fix pass.
//!
//! Two fixes in one pass may touch the same characters. Applying both would
//! corrupt the text, so each pass keeps a conflict-free subset and leaves the
//! rest for the next pass, where the engine re-reports them against fresh text.

use crate::types::Edit;

/// Select a maximal non-overlapping subset of `edits`, tail of the document first.
///
/// Candidates are ordered descending by `(end, start)`; a candidate is kept when
/// its end is at or before the start of the last kept edit. Touching ranges do
/// not conflict. When two edits compete, the one further down the document wins.
///
/// The result is in acceptance order (descending position), which is the order
/// [`apply_edits`](crate::apply_edits) needs to keep earlier offsets valid.
#[must_use]
pub fn select_non_overlapping(mut edits: Vec<Edit>) -> Vec<Edit> {
    // Stable: equal spans keep their reported order.
    edits.sort_by(|a, b| (b.end, b.start).cmp(&(a.end, a.start)));

    let mut kept: Vec<Edit> = Vec::with_capacity(edits.len());
    for candidate in edits {
        if let Some(last) = kept.last() {
            if candidate.end > last.start {
                continue;
            }
        }
        kept.push(candidate);
    }
    kept
}

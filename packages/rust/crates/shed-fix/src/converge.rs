//! Convergence loop.
//!
//! Repeats diagnose → filter → gate → resolve → patch against an external
//! diagnostic source until no admissible edit remains or the pass ceiling
//! is reached.

use serde::Serialize;
use tracing::{debug, warn};

use crate::filter::is_allowed;
use crate::gate::is_auto_applicable;
use crate::patch::apply_edits;
use crate::resolve::select_non_overlapping;
use crate::types::{Diagnostic, Edit};

/// Anything that can report diagnostics-with-fixes for a piece of source text.
///
/// Implementations must report positions already normalized to 0-based
/// coordinates (see [`decode_diagnostics`](crate::decode_diagnostics)).
pub trait DiagnosticSource {
    /// Failure raised by the source itself.
    type Error;

    /// Report the current diagnostics for `text`.
    ///
    /// # Errors
    /// Returns the source's own error when it cannot analyze the text.
    fn check(&self, text: &str) -> Result<Vec<Diagnostic>, Self::Error>;
}

impl<S: DiagnosticSource + ?Sized> DiagnosticSource for &S {
    type Error = S::Error;

    fn check(&self, text: &str) -> Result<Vec<Diagnostic>, Self::Error> {
        (**self).check(text)
    }
}

/// Terminal state of a convergence run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvergeState {
    /// No admissible edit remained.
    Converged,
    /// The pass ceiling was reached; the text is a best-effort result.
    Exhausted,
}

/// Result of one fix pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassResult {
    /// Number of edits applied in this pass.
    pub applied_count: usize,
    /// Text after the pass.
    pub next_text: String,
}

/// Result of a full convergence run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvergeOutcome {
    /// Final text.
    pub text: String,
    /// Number of passes that applied at least one edit.
    pub passes: usize,
    /// Total edits applied across all passes.
    pub applied: usize,
    /// How the loop stopped.
    pub state: ConvergeState,
}

/// Flatten the edits of every diagnostic that passes the rule filter and the
/// applicability gate. Edits with `start > end` are dropped.
pub fn admissible_edits<S: AsRef<str>>(diagnostics: Vec<Diagnostic>, allow_list: &[S]) -> Vec<Edit> {
    diagnostics
        .into_iter()
        .filter(|diagnostic| {
            is_allowed(diagnostic.rule_code.as_deref(), allow_list)
                && is_auto_applicable(diagnostic.applicability)
        })
        .flat_map(|diagnostic| {
            let code = diagnostic.rule_code;
            diagnostic.edits.into_iter().filter(move |edit| {
                let ok = edit.is_well_formed();
                if !ok {
                    warn!(rule = code.as_deref().unwrap_or("-"), ?edit, "dropping malformed edit");
                }
                ok
            })
        })
        .collect()
}

/// Run one pass over already-collected diagnostics.
///
/// `applied_count == 0` means the text is at a fixed point for this allow-list.
#[must_use]
pub fn run_pass<S: AsRef<str>>(text: &str, diagnostics: Vec<Diagnostic>, allow_list: &[S]) -> PassResult {
    let candidates = admissible_edits(diagnostics, allow_list);
    if candidates.is_empty() {
        return PassResult {
            applied_count: 0,
            next_text: text.to_owned(),
        };
    }

    let candidate_count = candidates.len();
    let selected = select_non_overlapping(candidates);
    if selected.is_empty() {
        return PassResult {
            applied_count: 0,
            next_text: text.to_owned(),
        };
    }

    debug!(
        candidates = candidate_count,
        deferred = candidate_count - selected.len(),
        "resolved fix candidates"
    );
    PassResult {
        applied_count: selected.len(),
        next_text: apply_edits(text, &selected),
    }
}

/// Apply admissible fixes from `source` to `initial` until a fixed point or
/// `max_passes` passes.
///
/// Reaching the ceiling is not an error: the outcome is returned with
/// [`ConvergeState::Exhausted`]. With `max_passes == 0` the source is never
/// consulted.
///
/// # Errors
/// Returns the source's error as soon as any `check` call fails; text from
/// earlier passes is discarded.
pub fn converge<D, S>(
    initial: &str,
    source: &D,
    allow_list: &[S],
    max_passes: usize,
) -> Result<ConvergeOutcome, D::Error>
where
    D: DiagnosticSource + ?Sized,
    S: AsRef<str>,
{
    let mut current = initial.to_owned();
    let mut passes = 0;
    let mut applied = 0;

    if max_passes == 0 {
        return Ok(ConvergeOutcome {
            text: current,
            passes,
            applied,
            state: ConvergeState::Exhausted,
        });
    }

    loop {
        let diagnostics = source.check(&current)?;
        let pass = run_pass(&current, diagnostics, allow_list);
        if pass.applied_count == 0 {
            debug!(passes, applied, "fix loop converged");
            return Ok(ConvergeOutcome {
                text: current,
                passes,
                applied,
                state: ConvergeState::Converged,
            });
        }

        current = pass.next_text;
        passes += 1;
        applied += pass.applied_count;
        debug!(pass = passes, edits = pass.applied_count, "applied fix pass");

        if passes >= max_passes {
            debug!(passes, applied, "fix loop hit pass ceiling");
            return Ok(ConvergeOutcome {
                text: current,
                passes,
                applied,
                state: ConvergeState::Exhausted,
            });
        }
    }
}

//! The composite "shed" pipeline: format → fix-converge → format.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use shed_fix::{ConvergeState, converge};
use thiserror::Error;
use tracing::{debug, info};

use crate::engine::{EngineSet, FormatOptions};
use crate::error::EngineError;

/// Default pass ceiling, matching the lint engine's own fix-loop bound.
pub const DEFAULT_MAX_PASSES: usize = 100;

/// Rules the fix stage applies by default.
///
/// Import sorting, language upgrades, unused variables/imports, comparison and
/// comprehension simplifications. `E731` (lambda assignment → def) is left out
/// on purpose.
pub const DEFAULT_ALLOW_LIST: &[&str] = &[
    "I", "UP", "F841", "F401", "E711", "E712", "E713", "E714", "SIM201", "SIM202", "SIM208",
    "SIM300", "C400", "C401", "C402", "C403", "C404", "C405", "C406", "C408", "C409", "C410",
    "C411", "C413", "C414", "C416", "C417", "C418", "C419",
];

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// First formatter run.
    Format,
    /// Lint-fix convergence.
    Fix,
    /// Second formatter run.
    Reformat,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Format => "format",
            Self::Fix => "fix",
            Self::Reformat => "reformat",
        })
    }
}

/// Successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutcome {
    /// Final text.
    pub formatted: String,
    /// `formatted != source`.
    pub changed: bool,
    /// Stages that completed.
    pub stages_run: BTreeSet<Stage>,
    /// Fix passes applied in the fix stage.
    pub fix_passes: usize,
    /// Edits applied across all fix passes.
    pub fixes_applied: usize,
    /// Whether the fix stage stopped at the pass ceiling.
    pub fix_exhausted: bool,
}

/// A stage failed; later stages were not run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{stage} stage failed: {error}")]
pub struct PipelineFailure {
    /// The failing stage.
    pub stage: Stage,
    /// Underlying engine error.
    #[source]
    pub error: EngineError,
    /// Text of the last trustworthy stage: the first formatter pass when the
    /// fix stage failed, the original source otherwise.
    pub fallback: String,
    /// Stages that completed before the failure.
    pub stages_run: BTreeSet<Stage>,
}

/// Pipeline configuration. Engines are passed per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    /// Formatter options for both format stages.
    pub format: FormatOptions,
    /// Rule prefixes the fix stage may apply.
    pub allow_list: Vec<String>,
    /// Fix pass ceiling.
    pub max_passes: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            format: FormatOptions::default(),
            allow_list: DEFAULT_ALLOW_LIST.iter().map(ToString::to_string).collect(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl Pipeline {
    /// Run format → fix-converge → format on `source`.
    ///
    /// # Errors
    /// Returns a [`PipelineFailure`] naming the failing stage. Nothing from a
    /// failed or later stage leaks into its `fallback`.
    pub fn run(&self, engines: &EngineSet, source: &str) -> Result<PipelineOutcome, PipelineFailure> {
        let mut stages_run = BTreeSet::new();

        let formatted = engines
            .formatter
            .format(source, &self.format)
            .map_err(|error| PipelineFailure {
                stage: Stage::Format,
                error,
                fallback: source.to_owned(),
                stages_run: stages_run.clone(),
            })?;
        stages_run.insert(Stage::Format);
        debug!(changed = formatted != source, "format stage done");

        let fixed = converge(
            &formatted,
            engines.diagnostics.as_ref(),
            self.allow_list.as_slice(),
            self.max_passes,
        )
        .map_err(|error| PipelineFailure {
            stage: Stage::Fix,
            error,
            fallback: formatted.clone(),
            stages_run: stages_run.clone(),
        })?;
        stages_run.insert(Stage::Fix);
        debug!(passes = fixed.passes, applied = fixed.applied, state = ?fixed.state, "fix stage done");

        let reformatted = engines
            .formatter
            .format(&fixed.text, &self.format)
            .map_err(|error| PipelineFailure {
                stage: Stage::Reformat,
                error,
                fallback: source.to_owned(),
                stages_run: stages_run.clone(),
            })?;
        stages_run.insert(Stage::Reformat);

        let changed = reformatted != source;
        info!(changed, fix_passes = fixed.passes, "pipeline finished");
        Ok(PipelineOutcome {
            formatted: reformatted,
            changed,
            stages_run,
            fix_passes: fixed.passes,
            fixes_applied: fixed.applied,
            fix_exhausted: fixed.state == ConvergeState::Exhausted,
        })
    }
}

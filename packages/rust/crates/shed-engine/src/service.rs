//! Formatting service: the outward `format_source` contract.
//!
//! Every failure (engine start-up, formatter rejection, diagnostic source
//! crash) is folded into a response carrying the original text. Besides the
//! composite pipeline the service exposes the formatter alone
//! ([`ShedService::format_only`]) and a lint report
//! ([`ShedService::lint_source`]).

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use shed_fix::{Diagnostic, DiagnosticSource};
use tracing::{debug, warn};

use crate::engine::{EngineProvider, EngineSet, Formatter};
use crate::error::EngineError;
use crate::handle::EngineHandle;
use crate::pipeline::{Pipeline, PipelineOutcome, Stage};
use crate::process::ToolchainProvider;
use crate::settings::ShedSettings;

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Stages that ran.
    pub stages_run: BTreeSet<Stage>,
    /// Fix passes that applied at least one edit.
    pub fix_passes: usize,
    /// Edits applied by the fix stage.
    pub fixes_applied: usize,
    /// Whether the fix stage stopped at the pass ceiling.
    pub fix_exhausted: bool,
}

/// Response of one formatting request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatResponse {
    /// False when any stage failed.
    pub success: bool,
    /// Formatted text on success; the original text otherwise.
    pub formatted: String,
    /// Whether `formatted` differs from the input.
    pub changed: bool,
    /// Present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    /// Failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FormatResponse {
    /// Failed response for `original`.
    #[must_use]
    pub fn failure(original: &str, error: impl ToString) -> Self {
        Self {
            success: false,
            formatted: original.to_owned(),
            changed: false,
            summary: None,
            error: Some(error.to_string()),
        }
    }
}

impl From<PipelineOutcome> for FormatResponse {
    fn from(outcome: PipelineOutcome) -> Self {
        Self {
            success: true,
            formatted: outcome.formatted,
            changed: outcome.changed,
            summary: Some(RunSummary {
                stages_run: outcome.stages_run,
                fix_passes: outcome.fix_passes,
                fixes_applied: outcome.fixes_applied,
                fix_exhausted: outcome.fix_exhausted,
            }),
            error: None,
        }
    }
}

/// One issue in a lint report. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintEntry {
    /// Rule code; absent for syntax errors.
    pub code: Option<String>,
    /// Diagnostic message.
    pub message: String,
    /// First line of the flagged range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// First column of the flagged range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// Last line of the flagged range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    /// Column just past the flagged range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
    /// Whether the engine offers a fix.
    pub fixable: bool,
    /// Description of the offered fix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_message: Option<String>,
}

impl From<Diagnostic> for LintEntry {
    fn from(diagnostic: Diagnostic) -> Self {
        let fixable = diagnostic.has_fix();
        Self {
            code: diagnostic.rule_code,
            message: diagnostic.message,
            line: diagnostic.location.map(|p| p.row + 1),
            column: diagnostic.location.map(|p| p.column + 1),
            end_line: diagnostic.end_location.map(|p| p.row + 1),
            end_column: diagnostic.end_location.map(|p| p.column + 1),
            fixable,
            fix_message: diagnostic.fix_message,
        }
    }
}

/// Response of one lint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintResponse {
    /// False when the lint engine could not run.
    pub success: bool,
    /// Issues in the order the engine reported them.
    pub diagnostics: Vec<LintEntry>,
    /// `diagnostics.len()`.
    pub total_issues: usize,
    /// Failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LintResponse {
    /// Failed response with no issues.
    #[must_use]
    pub fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            diagnostics: Vec::new(),
            total_issues: 0,
            error: Some(error.to_string()),
        }
    }
}

impl From<Vec<Diagnostic>> for LintResponse {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        let diagnostics: Vec<LintEntry> = diagnostics.into_iter().map(LintEntry::from).collect();
        Self {
            success: true,
            total_issues: diagnostics.len(),
            diagnostics,
            error: None,
        }
    }
}

/// Owns the engine handle and the pipeline configuration.
#[derive(Debug)]
pub struct ShedService {
    handle: EngineHandle,
    pipeline: Pipeline,
}

impl ShedService {
    /// Service over an arbitrary engine provider.
    #[must_use]
    pub fn new(handle: EngineHandle, pipeline: Pipeline) -> Self {
        Self { handle, pipeline }
    }

    /// Service backed by the subprocess tools named in `settings`.
    #[must_use]
    pub fn from_settings(settings: &ShedSettings) -> Self {
        let provider: Arc<dyn EngineProvider> = Arc::new(ToolchainProvider::new(settings.clone()));
        let handle = EngineHandle::new(provider).with_init_timeout(settings.init_timeout);
        Self::new(handle, settings.pipeline())
    }

    /// Format `code` with the composite pipeline. Never fails; see [`FormatResponse`].
    pub async fn format_source(&self, code: &str) -> FormatResponse {
        let engines = match self.engines().await {
            Ok(engines) => engines,
            Err(error) => return FormatResponse::failure(code, error),
        };

        let pipeline = self.pipeline.clone();
        let source = code.to_owned();
        match run_blocking(move || pipeline.run(&engines, &source)).await {
            Ok(Ok(outcome)) => FormatResponse::from(outcome),
            Ok(Err(failure)) => {
                warn!(stage = %failure.stage, error = %failure.error, "pipeline failed");
                FormatResponse::failure(code, failure.error)
            }
            Err(error) => FormatResponse::failure(code, error),
        }
    }

    /// Run the formatter alone, without the fix stage.
    pub async fn format_only(&self, code: &str) -> FormatResponse {
        let engines = match self.engines().await {
            Ok(engines) => engines,
            Err(error) => return FormatResponse::failure(code, error),
        };

        let options = self.pipeline.format;
        let source = code.to_owned();
        match run_blocking(move || engines.formatter.format(&source, &options)).await {
            Ok(Ok(formatted)) => FormatResponse {
                success: true,
                changed: formatted != code,
                formatted,
                summary: Some(RunSummary {
                    stages_run: BTreeSet::from([Stage::Format]),
                    fix_passes: 0,
                    fixes_applied: 0,
                    fix_exhausted: false,
                }),
                error: None,
            },
            Ok(Err(error)) | Err(error) => {
                warn!(%error, "format failed");
                FormatResponse::failure(code, error)
            }
        }
    }

    /// Report the lint engine's diagnostics for `code` without applying anything.
    pub async fn lint_source(&self, code: &str) -> LintResponse {
        let engines = match self.engines().await {
            Ok(engines) => engines,
            Err(error) => return LintResponse::failure(error),
        };

        let source = code.to_owned();
        match run_blocking(move || engines.linter.check(&source)).await {
            Ok(Ok(diagnostics)) => {
                debug!(count = diagnostics.len(), "lint finished");
                LintResponse::from(diagnostics)
            }
            Ok(Err(error)) | Err(error) => {
                warn!(%error, "lint failed");
                LintResponse::failure(error)
            }
        }
    }

    async fn engines(&self) -> Result<EngineSet, EngineError> {
        match self.handle.ready().await {
            Ok(engines) => Ok(engines.clone()),
            Err(error) => {
                warn!(%error, "engines unavailable");
                Err(error)
            }
        }
    }
}

/// Run blocking engine calls off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T, EngineError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|join_error| EngineError::Task(join_error.to_string()))
}

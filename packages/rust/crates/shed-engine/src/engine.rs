//! Engine contracts.
//!
//! The formatter and the diagnostic source are black boxes: the pipeline only
//! sees these traits, so tests inject in-process fakes and production wires
//! the subprocess adapters from [`crate::process`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use shed_fix::DiagnosticSource;

use crate::error::{EngineError, Result};

/// Options passed to the formatter on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Target line length.
    pub line_length: usize,
    /// Normalize string quotes to double quotes.
    pub normalize_string_quotes: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            line_length: 88,
            normalize_string_quotes: true,
        }
    }
}

/// A code formatter.
pub trait Formatter: Send + Sync {
    /// Format `text`.
    ///
    /// # Errors
    /// Returns [`EngineError::Format`] when the formatter rejects the input.
    fn format(&self, text: &str, options: &FormatOptions) -> Result<String>;
}

/// Diagnostic source shared across requests.
pub type SharedDiagnostics = Arc<dyn DiagnosticSource<Error = EngineError> + Send + Sync>;

/// The initialized engines. Read-only once built; cheap to clone.
#[derive(Clone)]
pub struct EngineSet {
    /// Primary code formatter.
    pub formatter: Arc<dyn Formatter>,
    /// Lint engine reporting diagnostics-with-fixes for the fix stage.
    pub diagnostics: SharedDiagnostics,
    /// Lint engine behind the standalone lint report. Same as `diagnostics`
    /// unless replaced with [`EngineSet::with_linter`].
    pub linter: SharedDiagnostics,
}

impl EngineSet {
    /// Bundle a formatter and a diagnostic source.
    pub fn new<F, D>(formatter: F, diagnostics: D) -> Self
    where
        F: Formatter + 'static,
        D: DiagnosticSource<Error = EngineError> + Send + Sync + 'static,
    {
        let diagnostics: SharedDiagnostics = Arc::new(diagnostics);
        Self {
            formatter: Arc::new(formatter),
            linter: Arc::clone(&diagnostics),
            diagnostics,
        }
    }

    /// Use a separate diagnostic source for lint reports.
    #[must_use]
    pub fn with_linter<L>(mut self, linter: L) -> Self
    where
        L: DiagnosticSource<Error = EngineError> + Send + Sync + 'static,
    {
        self.linter = Arc::new(linter);
        self
    }
}

impl fmt::Debug for EngineSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSet").finish_non_exhaustive()
    }
}

/// Builds the engine set. Expensive; called at most once per successful
/// [`EngineHandle`](crate::EngineHandle).
#[async_trait]
pub trait EngineProvider: Send + Sync {
    /// Start the engines.
    ///
    /// # Errors
    /// Returns [`EngineError::Init`] when any engine cannot be started.
    async fn initialize(&self) -> Result<EngineSet>;
}

/// Provider handing out an already-built engine set.
#[derive(Debug, Clone)]
pub struct ReadyEngines(pub EngineSet);

#[async_trait]
impl EngineProvider for ReadyEngines {
    async fn initialize(&self) -> Result<EngineSet> {
        Ok(self.0.clone())
    }
}

//! In-process engine doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shed_engine::{EngineError, EngineProvider, EngineSet, FormatOptions, Formatter};
use shed_fix::{Applicability, Diagnostic, DiagnosticSource, Edit, Position};

/// Strips trailing whitespace on every line and ends the text with one newline.
pub struct TidyFormatter;

impl Formatter for TidyFormatter {
    fn format(&self, text: &str, _options: &FormatOptions) -> Result<String, EngineError> {
        let body: Vec<&str> = text.trim_end().lines().map(str::trim_end).collect();
        if body.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{}\n", body.join("\n")))
    }
}

/// Rejects any text containing `def (`, like a parser would.
pub struct StrictFormatter;

impl Formatter for StrictFormatter {
    fn format(&self, text: &str, options: &FormatOptions) -> Result<String, EngineError> {
        if text.contains("def (") {
            return Err(EngineError::Format("Cannot parse: invalid syntax".to_string()));
        }
        TidyFormatter.format(text, options)
    }
}

/// Rejects everything on its `fail_on`-th call.
pub struct FailsOnCallFormatter {
    pub fail_on: usize,
    pub calls: AtomicUsize,
}

impl Formatter for FailsOnCallFormatter {
    fn format(&self, text: &str, options: &FormatOptions) -> Result<String, EngineError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(EngineError::Format(format!("formatter crashed on call {call}")));
        }
        TidyFormatter.format(text, options)
    }
}

/// Reports `E225` insertions around `=` and `+` that are not space-padded.
pub struct OperatorSpacing;

impl DiagnosticSource for OperatorSpacing {
    type Error = EngineError;

    fn check(&self, text: &str) -> Result<Vec<Diagnostic>, EngineError> {
        let mut diagnostics = Vec::new();
        for (row, line) in text.split('\n').enumerate() {
            let chars: Vec<char> = line.chars().collect();
            for (col, ch) in chars.iter().enumerate() {
                if *ch != '=' && *ch != '+' {
                    continue;
                }
                let mut edits = Vec::new();
                if col > 0 && chars[col - 1] != ' ' {
                    edits.push(Edit::insertion(Position::new(row, col), " "));
                }
                if col + 1 < chars.len() && chars[col + 1] != ' ' {
                    edits.push(Edit::insertion(Position::new(row, col + 1), " "));
                }
                if !edits.is_empty() {
                    diagnostics.push(
                        Diagnostic::new("E225", edits, Some(Applicability::Safe))
                            .with_message("Missing whitespace around operator")
                            .with_location(Position::new(row, col), Position::new(row, col + 1)),
                    );
                }
            }
        }
        Ok(diagnostics)
    }
}

/// Reports `F401` for every `import <name>` line, without a fix.
pub struct UnusedImports;

impl DiagnosticSource for UnusedImports {
    type Error = EngineError;

    fn check(&self, text: &str) -> Result<Vec<Diagnostic>, EngineError> {
        Ok(text
            .split('\n')
            .enumerate()
            .filter_map(|(row, line)| {
                let name = line.strip_prefix("import ")?;
                let start = Position::new(row, 7);
                let end = Position::new(row, 7 + name.chars().count());
                Some(
                    Diagnostic::new("F401", Vec::new(), None)
                        .with_message(format!("`{name}` imported but unused"))
                        .with_location(start, end),
                )
            })
            .collect())
    }
}

/// Wraps a source and fails on its `fail_on`-th call.
pub struct FlakySource<S> {
    pub inner: S,
    pub fail_on: usize,
    pub calls: AtomicUsize,
}

impl<S> FlakySource<S> {
    pub fn new(inner: S, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }
}

impl<S: DiagnosticSource<Error = EngineError>> DiagnosticSource for FlakySource<S> {
    type Error = EngineError;

    fn check(&self, text: &str) -> Result<Vec<Diagnostic>, EngineError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(EngineError::DiagnosticSource(format!(
                "lint engine crashed on call {call}"
            )));
        }
        self.inner.check(text)
    }
}

/// Engines used by most tests: tidy formatter + operator spacing fixes.
pub fn spacing_engines() -> EngineSet {
    EngineSet::new(TidyFormatter, OperatorSpacing)
}

/// Provider that counts attempts, takes `delay` to start, and fails the
/// first `failures` attempts.
pub struct CountingProvider {
    pub attempts: Arc<AtomicUsize>,
    pub delay: Duration,
    pub failures: usize,
}

impl CountingProvider {
    pub fn new(delay: Duration, failures: usize) -> Self {
        Self {
            attempts: Arc::new(AtomicUsize::new(0)),
            delay,
            failures,
        }
    }
}

#[async_trait]
impl EngineProvider for CountingProvider {
    async fn initialize(&self) -> Result<EngineSet, EngineError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if attempt <= self.failures {
            return Err(EngineError::Init(format!("install failed (attempt {attempt})")));
        }
        Ok(spacing_engines())
    }
}

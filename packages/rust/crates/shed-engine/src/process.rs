//! Subprocess-backed engines.
//!
//! Source text is handed to the tools on stdin and results read from stdout,
//! so user code is never spliced into a command line or script.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use async_trait::async_trait;
use shed_fix::{Diagnostic, DiagnosticSource, decode_diagnostics};
use tracing::debug;

use crate::engine::{EngineProvider, EngineSet, FormatOptions, Formatter};
use crate::error::{EngineError, Result};
use crate::settings::{FormatterKind, ShedSettings};

/// Run `program args...` with `input` on stdin and return stdout.
///
/// A non-zero exit is reported with the tool's stderr.
fn run_tool(program: &Path, args: &[String], input: &str) -> std::result::Result<String, String> {
    let name = program.display().to_string();
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn {name}: {e}"))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| format!("{name}: stdin was not captured"))?;
    let payload = input.to_owned();
    // stdin is fed from its own thread while stdout/stderr are drained.
    let writer = std::thread::spawn(move || stdin.write_all(payload.as_bytes()));

    let output = child
        .wait_with_output()
        .map_err(|e| format!("Failed to wait for {name}: {e}"))?;
    let written = writer.join();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{name} exited with {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        ));
    }

    written
        .map_err(|_| format!("{name}: stdin writer panicked"))?
        .map_err(|e| format!("{name}: failed to write stdin: {e}"))?;

    String::from_utf8(output.stdout).map_err(|_| format!("{name} produced non-UTF-8 output"))
}

/// Run `program --version` to confirm the tool is installed.
///
/// The child is killed if the returned future is dropped, e.g. by an
/// initialization timeout.
async fn version_check(program: &Path) -> Result<String> {
    let output = tokio::process::Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| EngineError::Init(format!("{} is not available: {e}", program.display())))?;
    if !output.status.success() {
        return Err(EngineError::Init(format!(
            "{} --version exited with {}",
            program.display(),
            output.status.code().unwrap_or(-1)
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Black, reading from stdin.
#[derive(Debug, Clone)]
pub struct BlackFormatter {
    program: PathBuf,
}

impl BlackFormatter {
    /// Use the `black` executable at `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line arguments for one format call.
    #[must_use]
    pub fn args(options: &FormatOptions) -> Vec<String> {
        let mut args = vec![
            "--quiet".to_string(),
            "--line-length".to_string(),
            options.line_length.to_string(),
        ];
        if !options.normalize_string_quotes {
            args.push("--skip-string-normalization".to_string());
        }
        args.push("-".to_string());
        args
    }
}

impl Formatter for BlackFormatter {
    fn format(&self, text: &str, options: &FormatOptions) -> Result<String> {
        run_tool(&self.program, &Self::args(options), text).map_err(EngineError::Format)
    }
}

/// Ruff's formatter, reading from stdin.
#[derive(Debug, Clone)]
pub struct RuffFormatter {
    program: PathBuf,
    stdin_filename: String,
}

impl RuffFormatter {
    /// Use the `ruff` executable at `program`; `stdin_filename` picks file-type rules.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, stdin_filename: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            stdin_filename: stdin_filename.into(),
        }
    }

    /// Command-line arguments for one format call.
    #[must_use]
    pub fn args(&self, options: &FormatOptions) -> Vec<String> {
        let mut args = vec![
            "format".to_string(),
            "--no-cache".to_string(),
            "--line-length".to_string(),
            options.line_length.to_string(),
            "--stdin-filename".to_string(),
            self.stdin_filename.clone(),
        ];
        if !options.normalize_string_quotes {
            args.push("--config".to_string());
            args.push("format.quote-style = 'preserve'".to_string());
        }
        args.push("-".to_string());
        args
    }
}

impl Formatter for RuffFormatter {
    fn format(&self, text: &str, options: &FormatOptions) -> Result<String> {
        run_tool(&self.program, &self.args(options), text).map_err(EngineError::Format)
    }
}

/// `ruff check` as a diagnostic source. Fixes are reported, never applied by ruff.
#[derive(Debug, Clone)]
pub struct RuffCheck {
    program: PathBuf,
    select: Vec<String>,
    stdin_filename: String,
}

impl RuffCheck {
    /// Check with the rules in `select` enabled.
    #[must_use]
    pub fn new(
        program: impl Into<PathBuf>,
        select: Vec<String>,
        stdin_filename: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            select,
            stdin_filename: stdin_filename.into(),
        }
    }

    /// Command-line arguments for one check call.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "check".to_string(),
            "--output-format=json".to_string(),
            "--exit-zero".to_string(),
            "--no-cache".to_string(),
        ];
        if !self.select.is_empty() {
            args.push(format!("--select={}", self.select.join(",")));
        }
        args.push("--stdin-filename".to_string());
        args.push(self.stdin_filename.clone());
        args.push("-".to_string());
        args
    }
}

impl DiagnosticSource for RuffCheck {
    type Error = EngineError;

    fn check(&self, text: &str) -> Result<Vec<Diagnostic>> {
        let stdout =
            run_tool(&self.program, &self.args(), text).map_err(EngineError::DiagnosticSource)?;
        let diagnostics =
            decode_diagnostics(&stdout).map_err(|e| EngineError::DiagnosticSource(e.to_string()))?;
        debug!(count = diagnostics.len(), "ruff check reported diagnostics");
        Ok(diagnostics)
    }
}

/// Builds subprocess engines from settings, checking each tool first.
#[derive(Debug, Clone)]
pub struct ToolchainProvider {
    settings: ShedSettings,
}

impl ToolchainProvider {
    /// Provider for the tools named in `settings`.
    #[must_use]
    pub fn new(settings: ShedSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl EngineProvider for ToolchainProvider {
    async fn initialize(&self) -> Result<EngineSet> {
        let settings = &self.settings;

        let ruff_version = version_check(&settings.ruff_path).await?;
        debug!(version = %ruff_version, "ruff available");

        let diagnostics = RuffCheck::new(
            settings.ruff_path.clone(),
            settings.select.clone(),
            settings.stdin_filename.clone(),
        );
        let linter = RuffCheck::new(
            settings.ruff_path.clone(),
            settings.lint_select.clone(),
            settings.stdin_filename.clone(),
        );

        let engines = match settings.formatter {
            FormatterKind::Black => {
                let black_version = version_check(&settings.black_path).await?;
                debug!(version = %black_version, "black available");
                EngineSet::new(BlackFormatter::new(settings.black_path.clone()), diagnostics)
            }
            FormatterKind::Ruff => EngineSet::new(
                RuffFormatter::new(settings.ruff_path.clone(), settings.stdin_filename.clone()),
                diagnostics,
            ),
        };
        Ok(engines.with_linter(linter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_args() {
        let args = BlackFormatter::args(&FormatOptions::default());
        assert_eq!(args, vec!["--quiet", "--line-length", "88", "-"]);

        let args = BlackFormatter::args(&FormatOptions {
            line_length: 100,
            normalize_string_quotes: false,
        });
        assert_eq!(
            args,
            vec!["--quiet", "--line-length", "100", "--skip-string-normalization", "-"]
        );
    }

    #[test]
    fn test_ruff_format_args_preserve_quotes() {
        let formatter = RuffFormatter::new("ruff", "demo.py");
        let args = formatter.args(&FormatOptions {
            line_length: 79,
            normalize_string_quotes: false,
        });
        assert!(args.starts_with(&["format".to_string()]));
        assert!(args.contains(&"79".to_string()));
        assert!(args.contains(&"format.quote-style = 'preserve'".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("-"));
    }

    #[test]
    fn test_ruff_check_args() {
        let check = RuffCheck::new("ruff", vec!["F401".into(), "I".into()], "demo.py");
        let args = check.args();
        assert!(args.contains(&"--output-format=json".to_string()));
        assert!(args.contains(&"--exit-zero".to_string()));
        assert!(args.contains(&"--select=F401,I".to_string()));
        assert!(!args.iter().any(|a| a == "--fix"));
    }

    #[test]
    fn test_missing_tool_is_a_format_error() {
        let formatter = BlackFormatter::new("/nonexistent/shed-test/black");
        let err = formatter
            .format("x = 1\n", &FormatOptions::default())
            .expect_err("missing binary");
        assert!(matches!(err, EngineError::Format(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_tool_round_trips_stdin() {
        let out = run_tool(Path::new("cat"), &[], "x = 1\n").expect("cat echoes stdin");
        assert_eq!(out, "x = 1\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_tool_reports_exit_status_over_broken_stdin() {
        // The tool exits without reading; the large payload cannot be fully written.
        let args = vec!["-c".to_string(), "echo 'Cannot parse' >&2; exit 3".to_string()];
        let input = "x = 1\n".repeat(200_000);
        let err = run_tool(Path::new("sh"), &args, &input).expect_err("non-zero exit");
        assert!(err.contains("exited with 3"), "{err}");
        assert!(err.contains("Cannot parse"), "{err}");
    }

    #[tokio::test]
    async fn test_missing_tool_fails_initialization() {
        let settings = ShedSettings {
            ruff_path: PathBuf::from("/nonexistent/shed-test/ruff"),
            ..ShedSettings::default()
        };
        let err = ToolchainProvider::new(settings)
            .initialize()
            .await
            .expect_err("missing binary");
        assert!(matches!(err, EngineError::Init(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_version_check_is_an_init_error() {
        // `false` exits 1 even for `--version`.
        let settings = ShedSettings {
            ruff_path: PathBuf::from("false"),
            ..ShedSettings::default()
        };
        let err = ToolchainProvider::new(settings)
            .initialize()
            .await
            .expect_err("version check fails");
        assert_eq!(
            err,
            EngineError::Init("false --version exited with 1".to_string())
        );
    }
}

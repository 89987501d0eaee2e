//! Settings loader.
//!
//! Loads and merges, later layers winning field by field:
//! - Built-in defaults
//! - User settings:  `<SHED_CONFIG_HOME or $HOME/.config>/shed/settings.yaml`
//! - Explicit file:  `--config <path>`
//!
//! A broken user file is ignored with a warning; a broken explicit file is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::engine::FormatOptions;
use crate::error::{EngineError, Result};
use crate::pipeline::{DEFAULT_ALLOW_LIST, DEFAULT_MAX_PASSES, Pipeline};

const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "shed/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
const DEFAULT_INIT_TIMEOUT_SECS: u64 = 120;

/// Rules reported by the standalone lint report: import, statement and
/// runtime errors, pyflakes, and warnings.
pub const DEFAULT_LINT_SELECT: &[&str] = &["E4", "E7", "E9", "F", "W"];

/// Which executable performs the format stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// `black -`
    #[default]
    Black,
    /// `ruff format -`
    Ruff,
}

/// One settings file. Every field is optional so layers can be merged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsLayer {
    pub line_length: Option<usize>,
    pub normalize_string_quotes: Option<bool>,
    pub max_passes: Option<usize>,
    pub allow_list: Option<Vec<String>>,
    pub select: Option<Vec<String>>,
    pub lint_select: Option<Vec<String>>,
    pub formatter: Option<FormatterKind>,
    pub black_path: Option<PathBuf>,
    pub ruff_path: Option<PathBuf>,
    pub stdin_filename: Option<String>,
    pub init_timeout_secs: Option<u64>,
}

impl SettingsLayer {
    /// Overlay `overlay` on `self`; set fields in `overlay` win.
    #[must_use]
    pub fn merge(self, overlay: Self) -> Self {
        Self {
            line_length: overlay.line_length.or(self.line_length),
            normalize_string_quotes: overlay
                .normalize_string_quotes
                .or(self.normalize_string_quotes),
            max_passes: overlay.max_passes.or(self.max_passes),
            allow_list: overlay.allow_list.or(self.allow_list),
            select: overlay.select.or(self.select),
            lint_select: overlay.lint_select.or(self.lint_select),
            formatter: overlay.formatter.or(self.formatter),
            black_path: overlay.black_path.or(self.black_path),
            ruff_path: overlay.ruff_path.or(self.ruff_path),
            stdin_filename: overlay.stdin_filename.or(self.stdin_filename),
            init_timeout_secs: overlay.init_timeout_secs.or(self.init_timeout_secs),
        }
    }
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShedSettings {
    /// Formatter line length.
    pub line_length: usize,
    /// Normalize string quotes.
    pub normalize_string_quotes: bool,
    /// Fix pass ceiling.
    pub max_passes: usize,
    /// Rule prefixes the fix stage may apply.
    pub allow_list: Vec<String>,
    /// Rules the lint engine is asked to report; defaults to the allow-list.
    pub select: Vec<String>,
    /// Rules the standalone lint report asks for.
    pub lint_select: Vec<String>,
    /// Formatter used by both format stages.
    pub formatter: FormatterKind,
    /// `black` executable.
    pub black_path: PathBuf,
    /// `ruff` executable.
    pub ruff_path: PathBuf,
    /// File name reported to the tools for stdin input.
    pub stdin_filename: String,
    /// Initialization bound; `None` disables it.
    pub init_timeout: Option<Duration>,
}

impl Default for ShedSettings {
    fn default() -> Self {
        Self::from(SettingsLayer::default())
    }
}

impl From<SettingsLayer> for ShedSettings {
    fn from(layer: SettingsLayer) -> Self {
        let allow_list = layer
            .allow_list
            .unwrap_or_else(|| DEFAULT_ALLOW_LIST.iter().map(ToString::to_string).collect());
        let select = layer.select.unwrap_or_else(|| allow_list.clone());
        let init_timeout = match layer.init_timeout_secs.unwrap_or(DEFAULT_INIT_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self {
            line_length: layer.line_length.unwrap_or(88),
            normalize_string_quotes: layer.normalize_string_quotes.unwrap_or(true),
            max_passes: layer.max_passes.unwrap_or(DEFAULT_MAX_PASSES),
            allow_list,
            select,
            lint_select: layer
                .lint_select
                .unwrap_or_else(|| DEFAULT_LINT_SELECT.iter().map(ToString::to_string).collect()),
            formatter: layer.formatter.unwrap_or_default(),
            black_path: layer.black_path.unwrap_or_else(|| PathBuf::from("black")),
            ruff_path: layer.ruff_path.unwrap_or_else(|| PathBuf::from("ruff")),
            stdin_filename: layer
                .stdin_filename
                .unwrap_or_else(|| "shed_input.py".to_string()),
            init_timeout,
        }
    }
}

impl ShedSettings {
    /// Formatter options for both format stages.
    #[must_use]
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            line_length: self.line_length,
            normalize_string_quotes: self.normalize_string_quotes,
        }
    }

    /// Pipeline configured from these settings.
    #[must_use]
    pub fn pipeline(&self) -> Pipeline {
        Pipeline {
            format: self.format_options(),
            allow_list: self.allow_list.clone(),
            max_passes: self.max_passes,
        }
    }
}

/// Load settings from the user file and an optional explicit file.
///
/// # Errors
/// Returns [`EngineError::Config`] when `explicit` is given but cannot be read or parsed.
pub fn load_settings(explicit: Option<&Path>) -> Result<ShedSettings> {
    load_settings_from_paths(&user_settings_path(), explicit)
}

/// Load settings from explicit layer paths.
///
/// # Errors
/// Returns [`EngineError::Config`] when `explicit` is given but cannot be read or parsed.
pub fn load_settings_from_paths(user: &Path, explicit: Option<&Path>) -> Result<ShedSettings> {
    let mut layer = load_optional(user);
    if let Some(path) = explicit {
        layer = layer.merge(load_required(path)?);
    }
    Ok(ShedSettings::from(layer))
}

/// Path of the user settings file.
#[must_use]
pub fn user_settings_path() -> PathBuf {
    config_home().join(DEFAULT_USER_SETTINGS_RELATIVE_PATH)
}

fn config_home() -> PathBuf {
    if let Some(dir) = non_empty_env("SHED_CONFIG_HOME") {
        return PathBuf::from(dir);
    }
    non_empty_env("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CONFIG_HOME_RELATIVE_PATH)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn load_optional(path: &Path) -> SettingsLayer {
    if !path.exists() {
        return SettingsLayer::default();
    }
    match load_required(path) {
        Ok(layer) => layer,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to load settings file; ignoring"
            );
            SettingsLayer::default()
        }
    }
}

fn load_required(path: &Path) -> Result<SettingsLayer> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
    if raw.trim().is_empty() {
        return Ok(SettingsLayer::default());
    }
    serde_yaml::from_str(&raw).map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ShedSettings::default();
        assert_eq!(settings.line_length, 88);
        assert!(settings.normalize_string_quotes);
        assert_eq!(settings.max_passes, DEFAULT_MAX_PASSES);
        assert_eq!(settings.select, settings.allow_list);
        assert_eq!(settings.lint_select, vec!["E4", "E7", "E9", "F", "W"]);
        assert!(!settings.allow_list.iter().any(|rule| rule == "E731"));
        assert_eq!(settings.formatter, FormatterKind::Black);
        assert_eq!(settings.init_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_merge_overlay_wins() {
        let base = SettingsLayer {
            line_length: Some(100),
            max_passes: Some(5),
            ..SettingsLayer::default()
        };
        let overlay = SettingsLayer {
            line_length: Some(79),
            formatter: Some(FormatterKind::Ruff),
            ..SettingsLayer::default()
        };
        let merged = base.merge(overlay);
        assert_eq!(merged.line_length, Some(79));
        assert_eq!(merged.max_passes, Some(5));
        assert_eq!(merged.formatter, Some(FormatterKind::Ruff));
    }

    #[test]
    fn test_zero_timeout_disables_bound() {
        let settings = ShedSettings::from(SettingsLayer {
            init_timeout_secs: Some(0),
            ..SettingsLayer::default()
        });
        assert_eq!(settings.init_timeout, None);
    }

    #[test]
    fn test_pipeline_from_settings() {
        let settings = ShedSettings::from(SettingsLayer {
            allow_list: Some(vec!["F".into()]),
            max_passes: Some(3),
            normalize_string_quotes: Some(false),
            ..SettingsLayer::default()
        });
        let pipeline = settings.pipeline();
        assert_eq!(pipeline.allow_list, vec!["F".to_string()]);
        assert_eq!(pipeline.max_passes, 3);
        assert!(!pipeline.format.normalize_string_quotes);
    }
}

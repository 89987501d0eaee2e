//! shed-engine - Engines and the composite formatting pipeline for Shed Fusion
//!
//! Wires the fix core to real tools and exposes `format_source`.
//!
//! # Features
//!
//! - **Engine contracts**: `Formatter` and the core's `DiagnosticSource`
//! - **Subprocess adapters**: Black / Ruff formatter, `ruff check` JSON diagnostics
//! - **Once-only initialization**: concurrent requests share one start-up attempt
//! - **Pipeline**: format → fix-converge → format, with per-stage fallback text
//! - **Standalone modes**: formatter alone and a lint report
//! - **Settings**: layered YAML with field-by-field merge
//!
//! # Architecture
//!
//! ```text
//! shed-engine/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # EngineError enum (thiserror)
//! ├── engine.rs   # Formatter, EngineSet, EngineProvider
//! ├── handle.rs   # EngineHandle (tokio OnceCell)
//! ├── process.rs  # Subprocess engines + ToolchainProvider
//! ├── pipeline.rs # Pipeline, Stage, PipelineOutcome, PipelineFailure
//! ├── service.rs  # ShedService: format_source, format_only, lint_source
//! ├── settings.rs # ShedSettings (serde_yaml)
//! └── diff.rs     # Unified diff preview
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use shed_engine::{ShedService, load_settings};
//!
//! let settings = load_settings(None)?;
//! let service = ShedService::from_settings(&settings);
//! let response = service.format_source("import os\nx=1\n").await;
//! assert!(response.success);
//! ```

mod diff;
mod engine;
mod error;
mod handle;
mod pipeline;
mod process;
mod service;
mod settings;

pub use diff::unified_diff;
pub use engine::{EngineProvider, EngineSet, FormatOptions, Formatter, ReadyEngines, SharedDiagnostics};
pub use error::{EngineError, Result};
pub use handle::EngineHandle;
pub use pipeline::{
    DEFAULT_ALLOW_LIST, DEFAULT_MAX_PASSES, Pipeline, PipelineFailure, PipelineOutcome, Stage,
};
pub use process::{BlackFormatter, RuffCheck, RuffFormatter, ToolchainProvider};
pub use service::{FormatResponse, LintEntry, LintResponse, RunSummary, ShedService};
pub use settings::{
    DEFAULT_LINT_SELECT, FormatterKind, SettingsLayer, ShedSettings, load_settings,
    load_settings_from_paths, user_settings_path,
};

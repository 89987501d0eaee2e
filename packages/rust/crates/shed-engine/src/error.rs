//! Error types for engines and the formatting pipeline.
//!
//! Follows the workspace convention: explicit `thiserror` enums with context.

use std::time::Duration;

use thiserror::Error;

/// Engine and pipeline errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Formatter or diagnostic engine failed to start (missing tool, failed version check).
    #[error("Engine initialization failed: {0}")]
    Init(String),

    /// Engine initialization did not finish within the configured bound.
    #[error("Engine initialization timed out after {0:?}")]
    InitTimeout(Duration),

    /// The formatter rejected the input (e.g. invalid syntax).
    #[error("Format error: {0}")]
    Format(String),

    /// The diagnostic source failed during a fix pass.
    #[error("Diagnostic source error: {0}")]
    DiagnosticSource(String),

    /// Settings could not be read or parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A blocking pipeline task was cancelled or panicked.
    #[error("Pipeline task failed: {0}")]
    Task(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

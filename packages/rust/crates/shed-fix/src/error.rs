//! Error types for the fix core.
//!
//! Library crates use `thiserror` for explicit error enums.

use thiserror::Error;

/// Errors raised while turning lint engine output into fix edits.
///
/// Diagnostic *content* never fails the convergence loop; only malformed
/// wire payloads end up here.
#[derive(Error, Debug)]
pub enum FixError {
    /// Lint engine output was not a JSON diagnostic array.
    #[error("Diagnostic decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for fix core operations.
pub type Result<T> = std::result::Result<T, FixError>;

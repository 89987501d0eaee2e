//! Lint engine wire format.
//!
//! The engine reports diagnostics as a JSON array (`ruff check
//! --output-format=json`) with 1-based rows and columns. Decoding turns each
//! entry into a [`Diagnostic`] with 0-based positions.

use serde::Deserialize;

use crate::error::Result;
use crate::types::{Applicability, Diagnostic, Edit, Position};

/// A 1-based location as reported by the engine.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WireLocation {
    /// Line number (1-indexed).
    pub row: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl From<WireLocation> for Position {
    fn from(location: WireLocation) -> Self {
        Position::from_one_based(location.row, location.column)
    }
}

/// One edit of a fix.
#[derive(Debug, Clone, Deserialize)]
pub struct WireEdit {
    /// Replacement text; `null` means deletion.
    #[serde(default)]
    pub content: Option<String>,
    /// Start of the replaced range.
    pub location: WireLocation,
    /// End of the replaced range (exclusive).
    pub end_location: WireLocation,
}

impl From<WireEdit> for Edit {
    fn from(edit: WireEdit) -> Self {
        Edit::new(
            edit.location.into(),
            edit.end_location.into(),
            edit.content.unwrap_or_default(),
        )
    }
}

/// A fix attached to a diagnostic.
#[derive(Debug, Clone, Deserialize)]
pub struct WireFix {
    /// Engine-declared applicability.
    #[serde(default)]
    pub applicability: Option<Applicability>,
    /// Short description of the fix.
    #[serde(default)]
    pub message: Option<String>,
    /// Edits in reported order.
    #[serde(default)]
    pub edits: Vec<WireEdit>,
}

/// One diagnostic entry. Unknown fields (`url`, `noqa_row`, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct WireDiagnostic {
    /// Rule code; `null` for syntax errors.
    #[serde(default)]
    pub code: Option<String>,
    /// Diagnostic message.
    #[serde(default)]
    pub message: String,
    /// Start of the flagged range.
    #[serde(default)]
    pub location: Option<WireLocation>,
    /// End of the flagged range.
    #[serde(default)]
    pub end_location: Option<WireLocation>,
    /// Fix, when the rule offers one.
    #[serde(default)]
    pub fix: Option<WireFix>,
}

impl From<WireDiagnostic> for Diagnostic {
    fn from(wire: WireDiagnostic) -> Self {
        let (edits, applicability, fix_message) = match wire.fix {
            Some(fix) => (
                fix.edits.into_iter().map(Edit::from).collect(),
                fix.applicability,
                fix.message,
            ),
            None => (Vec::new(), None, None),
        };
        Diagnostic {
            rule_code: wire.code,
            message: wire.message,
            location: wire.location.map(Position::from),
            end_location: wire.end_location.map(Position::from),
            fix_message,
            edits,
            applicability,
        }
    }
}

/// Decode the engine's JSON diagnostic array. Blank output means no diagnostics.
///
/// # Errors
/// Returns [`FixError::Decode`](crate::FixError::Decode) when the payload is
/// not a JSON array of diagnostics.
pub fn decode_diagnostics(payload: &str) -> Result<Vec<Diagnostic>> {
    if payload.trim().is_empty() {
        return Ok(Vec::new());
    }
    let wire: Vec<WireDiagnostic> = serde_json::from_str(payload)?;
    Ok(wire.into_iter().map(Diagnostic::from).collect())
}

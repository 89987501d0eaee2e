//! Core types for fix application.
//!
//! Defines the span-edit model shared by the filter, resolver, patcher and loop.

use serde::{Deserialize, Serialize};

/// A location in source text.
///
/// Both fields are 0-based. Columns count characters, the unit the lint
/// engine reports. The derived ordering is row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line index (0-indexed).
    pub row: usize,
    /// Character offset within the line (0-indexed).
    pub column: usize,
}

impl Position {
    /// Create a position from 0-based coordinates.
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Create a position from the lint engine's 1-based coordinates.
    ///
    /// A zero coordinate is clamped to the first row/column.
    #[must_use]
    pub const fn from_one_based(row: usize, column: usize) -> Self {
        Self {
            row: row.saturating_sub(1),
            column: column.saturating_sub(1),
        }
    }
}

/// Replace the half-open range `[start, end)` with `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// First replaced position (inclusive).
    pub start: Position,
    /// End of the replaced range (exclusive).
    pub end: Position,
    /// Replacement text; may contain newlines, may be empty (deletion).
    pub content: String,
}

impl Edit {
    /// Create a replacement edit.
    #[must_use]
    pub fn new(start: Position, end: Position, content: impl Into<String>) -> Self {
        Self {
            start,
            end,
            content: content.into(),
        }
    }

    /// Create a pure insertion at `at`.
    #[must_use]
    pub fn insertion(at: Position, content: impl Into<String>) -> Self {
        Self::new(at, at, content)
    }

    /// Create a deletion of `[start, end)`.
    #[must_use]
    pub fn deletion(start: Position, end: Position) -> Self {
        Self::new(start, end, String::new())
    }

    /// True when the edit starts and ends on the same line.
    #[must_use]
    pub fn is_single_line(&self) -> bool {
        self.start.row == self.end.row
    }

    /// `start <= end` in row-major order.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }
}

/// The lint engine's confidence label for a fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Applicability {
    /// Preserves runtime behavior; may be applied automatically.
    Safe,
    /// May change behavior; requires human review.
    Unsafe,
    /// Shown to the user but never applied.
    #[serde(alias = "displayonly")]
    DisplayOnly,
    /// A label this crate does not know about.
    #[serde(other)]
    Unknown,
}

/// One reported issue, optionally carrying a fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule identifier such as `F401`; absent for syntax errors.
    pub rule_code: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Start of the flagged range.
    #[serde(default)]
    pub location: Option<Position>,
    /// End of the flagged range (exclusive).
    #[serde(default)]
    pub end_location: Option<Position>,
    /// Short description of the fix, when one is offered.
    #[serde(default)]
    pub fix_message: Option<String>,
    /// Fix edits in the order the engine reported them.
    #[serde(default)]
    pub edits: Vec<Edit>,
    /// Fix applicability; `None` when unspecified.
    pub applicability: Option<Applicability>,
}

impl Diagnostic {
    /// Create a diagnostic with a fix.
    #[must_use]
    pub fn new(
        rule_code: impl Into<String>,
        edits: Vec<Edit>,
        applicability: Option<Applicability>,
    ) -> Self {
        Self {
            rule_code: Some(rule_code.into()),
            message: String::new(),
            location: None,
            end_location: None,
            fix_message: None,
            edits,
            applicability,
        }
    }

    /// Attach a message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach the flagged range.
    #[must_use]
    pub fn with_location(mut self, start: Position, end: Position) -> Self {
        self.location = Some(start);
        self.end_location = Some(end);
        self
    }

    /// True when the diagnostic carries at least one edit.
    #[must_use]
    pub fn has_fix(&self) -> bool {
        !self.edits.is_empty()
    }
}

//! Applicability gate.

use crate::types::Applicability;

/// Decide whether a fix may be applied without user confirmation.
///
/// `Safe` and unspecified fixes pass; everything the engine marks as needing
/// review (or only for display) does not.
#[must_use]
pub fn is_auto_applicable(applicability: Option<Applicability>) -> bool {
    matches!(applicability, None | Some(Applicability::Safe))
}

//! shed-fix - Lint-fix convergence core for Shed Fusion
//!
//! Applies auto-fixes reported by an external lint engine to source text,
//! one pass at a time, until no admissible fix remains or a pass ceiling is hit.
//!
//! # Features
//!
//! - **Rule Filter**: exact or prefix matching against an allow-list (`F` admits `F401`)
//! - **Safety Gate**: only `safe` or unspecified fixes are applied without review
//! - **Overlap Resolver**: deterministic, tail-first selection of non-conflicting edits
//! - **Text Patcher**: line/column span replacement that never corrupts offsets
//! - **Convergence Loop**: diagnose, filter, resolve, patch, repeat
//!
//! # Architecture
//!
//! ```text
//! shed-fix/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # FixError enum (thiserror)
//! ├── types.rs    # Position, Edit, Diagnostic, Applicability
//! ├── filter.rs   # Rule allow-list matching
//! ├── gate.rs     # Applicability gate
//! ├── resolve.rs  # Overlap resolution
//! ├── patch.rs    # Text patching
//! ├── converge.rs # DiagnosticSource trait + convergence loop
//! └── wire.rs     # Lint engine JSON (1-based) decoding
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use shed_fix::{converge, DiagnosticSource};
//!
//! let outcome = converge("import os\nx = 1\n", &ruff, &["F401".to_string()], 100)?;
//! assert_eq!(outcome.text, "x = 1\n");
//! ```

mod converge;
mod error;
mod filter;
mod gate;
mod patch;
mod resolve;
mod types;
mod wire;

pub use converge::{
    ConvergeOutcome, ConvergeState, DiagnosticSource, PassResult, admissible_edits, converge,
    run_pass,
};
pub use error::{FixError, Result};
pub use filter::is_allowed;
pub use gate::is_auto_applicable;
pub use patch::apply_edits;
pub use resolve::select_non_overlapping;
pub use types::{Applicability, Diagnostic, Edit, Position};
pub use wire::{WireDiagnostic, WireEdit, WireFix, WireLocation, decode_diagnostics};

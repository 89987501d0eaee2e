//! Plain-text lint report.

use std::fmt::Write;

use shed_engine::{LintEntry, LintResponse};

/// One line per issue (`name:line:col: CODE message`), then a count.
pub(crate) fn render_lint(name: &str, report: &LintResponse) -> String {
    let mut out = String::new();
    for entry in &report.diagnostics {
        let _ = writeln!(out, "{}", render_entry(name, entry));
    }
    let fixable = report.diagnostics.iter().filter(|e| e.fixable).count();
    match report.total_issues {
        0 => out.push_str("All checks passed!\n"),
        1 => {
            let _ = writeln!(out, "Found 1 issue ({fixable} fixable).");
        }
        n => {
            let _ = writeln!(out, "Found {n} issues ({fixable} fixable).");
        }
    }
    out
}

fn render_entry(name: &str, entry: &LintEntry) -> String {
    let position = match (entry.line, entry.column) {
        (Some(line), Some(column)) => format!("{name}:{line}:{column}:"),
        _ => format!("{name}:"),
    };
    let code = entry.code.as_deref().unwrap_or("syntax-error");
    let mut line = format!("{position} {code} {}", entry.message);
    if entry.fixable {
        line.push_str(" [*]");
    }
    if let Some(fix) = &entry.fix_message {
        let _ = write!(line, " ({fix})");
    }
    line
}

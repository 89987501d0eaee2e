//! shed CLI: format one Python file (or stdin) through the shed pipeline.
//!
//! Modes: `shed` (format, fix, format), `format` (formatter alone), `lint`
//! (diagnostics report).
//!
//! Logging: set `RUST_LOG=shed_engine=debug` (or `--verbose`) to see pass-level logs on stderr.
//!
//! Exit status: 0 on success, 1 when `--check` finds changes or `lint` finds
//! issues, 2 when the engines failed.

mod cli;
mod report;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

use shed_engine::{FormatResponse, LintResponse, ShedService, load_settings, unified_diff};

use crate::cli::{Cli, Mode};
use crate::report::render_lint;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG overrides; --verbose => debug for the shed crates; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "shed_fix=debug,shed_engine=debug"
        } else {
            "info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(formatter) = cli.formatter {
        settings.formatter = formatter.into();
    }
    let source = read_input(&cli).await?;
    let service = ShedService::from_settings(&settings);

    let (rendered, code) = match cli.mode {
        Mode::Shed => render_format(&cli, &source, &service.format_source(&source).await)?,
        Mode::Format => render_format(&cli, &source, &service.format_only(&source).await)?,
        Mode::Lint => render_lint_mode(&cli, &service.lint_source(&source).await)?,
    };

    let mut stdout = tokio::io::stdout();
    stdout.write_all(rendered.as_bytes()).await?;
    stdout.flush().await?;
    Ok(code)
}

async fn read_input(cli: &Cli) -> anyhow::Result<String> {
    match cli.input_path() {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn render_format(
    cli: &Cli,
    source: &str,
    response: &FormatResponse,
) -> anyhow::Result<(String, ExitCode)> {
    tracing::debug!(
        success = response.success,
        changed = response.changed,
        "format finished"
    );
    let rendered = if cli.json {
        to_json(response)?
    } else if cli.diff {
        unified_diff(&cli.display_name(), source, &response.formatted)
    } else if cli.check {
        String::new()
    } else {
        response.formatted.clone()
    };

    if !cli.json {
        if let Some(error) = &response.error {
            eprintln!("shed: {error}");
        }
    }

    let code = if !response.success {
        ExitCode::from(2)
    } else if cli.check && response.changed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    };
    Ok((rendered, code))
}

fn render_lint_mode(cli: &Cli, report: &LintResponse) -> anyhow::Result<(String, ExitCode)> {
    let rendered = if cli.json {
        to_json(report)?
    } else if report.success {
        render_lint(&cli.display_name(), report)
    } else {
        String::new()
    };

    if !cli.json {
        if let Some(error) = &report.error {
            eprintln!("shed: {error}");
        }
    }

    let code = if !report.success {
        ExitCode::from(2)
    } else if report.total_issues > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    };
    Ok((rendered, code))
}

fn to_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}

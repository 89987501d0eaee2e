use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use shed_engine::FormatterKind;

#[derive(Debug, Parser)]
#[command(name = "shed")]
#[command(about = "Format Python source: format, apply safe lint fixes, format again.")]
pub(crate) struct Cli {
    /// Python file to format; reads stdin when omitted or `-`.
    pub(crate) path: Option<PathBuf>,

    /// What to run on the input.
    #[arg(long, value_enum, default_value_t = Mode::Shed)]
    pub(crate) mode: Mode,

    /// Override the formatter from the settings files.
    #[arg(long, value_enum)]
    pub(crate) formatter: Option<FormatterArg>,

    /// Extra settings file layered over the user settings.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Print the JSON response instead of the formatted text.
    #[arg(long, conflicts_with = "diff")]
    pub(crate) json: bool,

    /// Print a unified diff against the input.
    #[arg(long)]
    pub(crate) diff: bool,

    /// Exit with status 1 when the input would change.
    #[arg(long)]
    pub(crate) check: bool,

    /// Debug logging for the fix core and engines.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Mode {
    /// Format, apply safe lint fixes, format again.
    Shed,
    /// Run the formatter alone.
    Format,
    /// Report lint diagnostics without changing anything.
    Lint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum FormatterArg {
    /// Black.
    Black,
    /// `ruff format`.
    Ruff,
}

impl From<FormatterArg> for FormatterKind {
    fn from(arg: FormatterArg) -> Self {
        match arg {
            FormatterArg::Black => Self::Black,
            FormatterArg::Ruff => Self::Ruff,
        }
    }
}

impl Cli {
    /// Input path, or `None` for stdin.
    pub(crate) fn input_path(&self) -> Option<&PathBuf> {
        self.path.as_ref().filter(|p| p.as_os_str() != "-")
    }

    /// Name shown in diff headers and lint reports.
    pub(crate) fn display_name(&self) -> String {
        self.input_path()
            .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string())
    }
}

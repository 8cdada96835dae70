//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shopcheck: end-to-end suites for the Automation Exercise storefront
#[derive(Parser, Debug)]
#[command(name = "shopcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v info logs, -vv debug logs)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the storefront
    Test(TestArgs),

    /// List scenarios without running them
    List(ListArgs),

    /// Summarize the last run's report
    Report(ReportArgs),
}

/// Scenario selection shared by `test` and `list`
#[derive(Parser, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Run only this suite (account, products, home, cart, checkout, contact, api)
    #[arg(short, long)]
    pub suite: Option<String>,

    /// Regex matched against "suite / name"
    #[arg(short, long)]
    pub grep: Option<String>,
}

/// Arguments for the test command
#[derive(Parser, Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct TestArgs {
    /// Scenario selection
    #[command(flatten)]
    pub select: SelectArgs,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Headed, slowed down, devtools open, every step logged, stop at first failure
    #[arg(long)]
    pub debug: bool,

    /// Re-run a failed scenario up to N times
    #[arg(long)]
    pub retries: Option<u32>,

    /// Per-scenario timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Stop at the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Storefront base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Config file (default: ./shopcheck.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory for reports, screenshots and traces
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug, Clone, Default)]
pub struct ListArgs {
    /// Scenario selection
    #[command(flatten)]
    pub select: SelectArgs,
}

/// Arguments for the report command
#[derive(Parser, Debug, Clone)]
pub struct ReportArgs {
    /// Output directory of the run
    #[arg(short, long, default_value = "shopcheck-report")]
    pub output: PathBuf,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

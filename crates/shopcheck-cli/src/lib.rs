//! Shopcheck CLI Library
//!
//! Command-line front end for the storefront suites: argument parsing,
//! logging setup, progress output and the `test` / `list` / `report`
//! commands.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ListArgs, LogFormatArg, ReportArgs, SelectArgs, TestArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{failure_detail, ProgressReporter};
pub use runner::{has_results, select, suite_config, TestRunner};

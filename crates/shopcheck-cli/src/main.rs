//! Shopcheck CLI: end-to-end suites for the Automation Exercise storefront
//!
//! ## Usage
//!
//! ```bash
//! shopcheck test                        # Run every scenario
//! shopcheck test --suite cart           # One suite
//! shopcheck test --grep "login" --debug # By name, headed and slowed down
//! shopcheck list --suite api            # What would run
//! shopcheck report                      # Summary of the last run
//! ```

use clap::Parser;
use shopcheck_cli::{logging, Cli, CliConfig, CliResult, Commands, TestRunner};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    logging::init(&config);

    let mut runner = TestRunner::new(config);
    match cli.command {
        Commands::Test(args) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(runner.run_tests(&args))
        }
        Commands::List(args) => runner.list(&args),
        Commands::Report(args) => runner.report(&args),
    }
}

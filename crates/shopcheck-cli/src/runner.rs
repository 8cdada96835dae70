//! Command execution: `test`, `list` and `report`

use std::path::Path;

use shopcheck::{
    flows, Browser, RunReport, Scenario, ScenarioFilter, SuiteConfig, SuiteRunner, HTML_REPORT,
    JSON_REPORT,
};
use tracing::{debug, info};

use crate::commands::{ListArgs, ReportArgs, SelectArgs, TestArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{failure_detail, ProgressReporter};

/// Runs CLI commands against the scenario registry
#[derive(Debug)]
pub struct TestRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl TestRunner {
    /// Create a new runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Run the selected scenarios in a browser and write the reports
    pub async fn run_tests(&mut self, args: &TestArgs) -> CliResult<()> {
        let suite_config = suite_config(args)?;
        let scenarios = select(&args.select)?;
        let runner = SuiteRunner::new(suite_config.clone())?;

        self.reporter.header(&format!(
            "shopcheck: {} scenarios against {}",
            scenarios.len(),
            suite_config.base_url
        ));
        let browser = Browser::launch(suite_config.browser_config()).await?;
        let report = runner.run(&scenarios, &browser, &mut self.reporter).await;
        if let Err(e) = browser.close().await {
            debug!(error = %e, "browser close failed");
        }
        self.reporter.finish();

        let html = report.write_all(&suite_config.output_dir)?;
        info!(report = %html.display(), "reports written");

        let failures = report.failures();
        if !failures.is_empty() {
            self.reporter.header("Failures");
            for result in &failures {
                self.reporter.failure(&failure_detail(result));
            }
        }
        self.reporter.summary(
            report.passed_count(),
            report.failed_count(),
            report.skipped_count(),
            report.total_duration(),
        );
        self.reporter.info(&format!("HTML report: {}", html.display()));

        if report.all_passed() {
            Ok(())
        } else {
            Err(CliError::TestsFailed {
                failed: report.failed_count(),
                total: report.total_count(),
            })
        }
    }

    /// Print matching scenario ids to stdout, one per line
    pub fn list(&self, args: &ListArgs) -> CliResult<()> {
        let scenarios = select(&args.select)?;
        for scenario in &scenarios {
            println!("{}", scenario.id());
        }
        self.reporter.info(&format!("{} scenarios", scenarios.len()));
        Ok(())
    }

    /// Print the last run's summary and where its HTML report is
    pub fn report(&self, args: &ReportArgs) -> CliResult<()> {
        if !has_results(&args.output) {
            return Err(CliError::report_generation(format!(
                "no {JSON_REPORT} in {}; run `shopcheck test` first",
                args.output.display()
            )));
        }
        let report = RunReport::load(&args.output.join(JSON_REPORT))?;
        println!("{}", report.summary());

        let html = args.output.join(HTML_REPORT);
        if html.is_file() {
            println!("HTML report: {}", html.display());
        }
        if !report.all_passed() {
            self.reporter.warning("the last run had failures");
        }
        Ok(())
    }
}

/// Config file and environment, then the command-line flags
pub fn suite_config(args: &TestArgs) -> CliResult<SuiteConfig> {
    let mut config = SuiteConfig::load(args.config.as_deref())?;
    if args.headed {
        config.headless = false;
    }
    if let Some(retries) = args.retries {
        config.retries = retries;
    }
    if let Some(timeout) = args.timeout {
        config.scenario_timeout_ms = timeout;
    }
    if let Some(ref url) = args.base_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(ref dir) = args.output {
        config.output_dir = dir.clone();
    }
    if args.fail_fast {
        config.fail_fast = true;
    }
    if args.debug {
        config.enable_debug();
    }
    config.validate()?;
    Ok(config)
}

/// Registry entries matching `--suite` and `--grep`; an empty match is an error
pub fn select(args: &SelectArgs) -> CliResult<Vec<Scenario>> {
    if let Some(ref suite) = args.suite {
        let known = flows::suites();
        if !known.contains(&suite.as_str()) {
            return Err(CliError::invalid_argument(format!(
                "unknown suite '{suite}'; expected one of: {}",
                known.join(", ")
            )));
        }
    }
    let filter = ScenarioFilter::new(args.suite.as_deref(), args.grep.as_deref())?;
    let scenarios = filter.select(&flows::all());
    if scenarios.is_empty() {
        return Err(CliError::invalid_argument("no scenarios match the selection"));
    }
    Ok(scenarios)
}

/// True when `dir` holds a finished run
#[must_use]
pub fn has_results(dir: &Path) -> bool {
    dir.join(JSON_REPORT).is_file()
}

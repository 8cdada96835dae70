//! Sequential scenario runner.
//!
//! One scenario at a time, each on a fresh driver from a [`DriverFactory`].
//! A scenario attempt is bounded by `scenario_timeout_ms`; a failed
//! scenario is re-run from the start up to `retries` times. On failure the
//! page is screenshotted into `screenshots/`, and every scenario's last
//! step trace lands in `traces/`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use regex::Regex;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::api::ApiClient;
use crate::config::SuiteConfig;
use crate::driver::{Driver, DriverFactory};
use crate::page::Page;
use crate::reporter::{Reporter, ScenarioResult, TraceData};
use crate::result::{ShopError, ShopResult};
use crate::scenario::{Scenario, ScenarioContext};

/// Failure screenshots, relative to the output directory
pub const SCREENSHOT_DIR: &str = "screenshots";
/// Step traces, relative to the output directory
pub const TRACE_DIR: &str = "traces";

/// Which scenarios to run: an exact suite name and/or a regex on `suite / name`
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    suite: Option<String>,
    grep: Option<Regex>,
}

impl ScenarioFilter {
    /// Everything
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from CLI-style options
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Config` for an invalid regex
    pub fn new(suite: Option<&str>, grep: Option<&str>) -> ShopResult<Self> {
        let grep = grep
            .map(|pattern| {
                Regex::new(pattern)
                    .map_err(|e| ShopError::config(format!("invalid --grep pattern: {e}")))
            })
            .transpose()?;
        Ok(Self {
            suite: suite.map(str::to_string),
            grep,
        })
    }

    #[must_use]
    pub fn matches(&self, scenario: &Scenario) -> bool {
        self.suite.as_deref().map_or(true, |s| s == scenario.suite)
            && self
                .grep
                .as_ref()
                .map_or(true, |re| re.is_match(&scenario.id()))
    }

    /// Matching scenarios, in registry order
    #[must_use]
    pub fn select(&self, scenarios: &[Scenario]) -> Vec<Scenario> {
        scenarios
            .iter()
            .filter(|s| self.matches(s))
            .copied()
            .collect()
    }
}

/// Progress callbacks; every method defaults to doing nothing
pub trait RunObserver {
    fn run_started(&mut self, _total: usize) {}

    fn attempt_started(&mut self, _scenario: &Scenario, _attempt: u32) {}

    fn scenario_finished(&mut self, _result: &ScenarioResult) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl RunObserver for Silent {}

/// Runs scenarios one after another
#[derive(Debug, Clone)]
pub struct SuiteRunner {
    config: SuiteConfig,
}

impl SuiteRunner {
    /// Create a runner after validating the config
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Config` if the config does not validate
    pub fn new(config: SuiteConfig) -> ShopResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    fn output(&self, relative: &Path) -> PathBuf {
        self.config.output_dir.join(relative)
    }

    /// Run every scenario and collect the results
    ///
    /// With fail-fast on, the first failure stops the run and the remaining
    /// scenarios are recorded as skipped. Reports are not written here; see
    /// [`Reporter::write_all`].
    pub async fn run(
        &self,
        scenarios: &[Scenario],
        factory: &dyn DriverFactory,
        observer: &mut dyn RunObserver,
    ) -> Reporter {
        let mut reporter = Reporter::new(self.config.failure_mode());
        reporter.start();
        observer.run_started(scenarios.len());
        info!(
            scenarios = scenarios.len(),
            base_url = %self.config.base_url,
            "starting run"
        );

        let mut remaining = scenarios.iter();
        for scenario in remaining.by_ref() {
            let result = self
                .run_scenario(scenario, factory, observer)
                .instrument(info_span!("scenario", id = %scenario.id()))
                .await;
            observer.scenario_finished(&result);
            if let Err(stop) = reporter.record(result) {
                warn!(%stop, "stopping run");
                break;
            }
        }
        for scenario in remaining {
            let skipped = ScenarioResult::skipped(scenario.suite, scenario.name);
            observer.scenario_finished(&skipped);
            let _ = reporter.record(skipped);
        }

        info!(summary = %reporter.summary(), "run finished");
        reporter
    }

    /// Run one scenario with retries
    pub async fn run_scenario(
        &self,
        scenario: &Scenario,
        factory: &dyn DriverFactory,
        observer: &mut dyn RunObserver,
    ) -> ScenarioResult {
        let started = Instant::now();
        let max_attempts = self.config.retries.saturating_add(1);
        let mut attempt = 1;
        loop {
            observer.attempt_started(scenario, attempt);
            info!(attempt, "running {}", scenario.id());
            let (outcome, trace, screenshot) = self.attempt(scenario, factory, attempt).await;
            let trace_path = self.save_trace(scenario, &trace);

            let result = match outcome {
                Ok(()) => ScenarioResult::passed(scenario.suite, scenario.name, started.elapsed()),
                Err(e) if attempt < max_attempts => {
                    warn!(attempt, error = %e, "scenario failed, retrying");
                    attempt += 1;
                    continue;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "scenario failed");
                    let failed = ScenarioResult::failed(
                        scenario.suite,
                        scenario.name,
                        started.elapsed(),
                        e.to_string(),
                    );
                    match screenshot {
                        Some(path) => failed.with_screenshot(path),
                        None => failed,
                    }
                }
            };
            let result = result.with_attempts(attempt);
            return match trace_path {
                Some(path) => result.with_trace(&trace, path),
                None => result,
            };
        }
    }

    /// One attempt on a fresh driver: outcome, trace, failure screenshot
    async fn attempt(
        &self,
        scenario: &Scenario,
        factory: &dyn DriverFactory,
        attempt: u32,
    ) -> (ShopResult<()>, TraceData, Option<PathBuf>) {
        let trace = TraceData::new(scenario.id(), attempt);
        let driver = match factory.new_driver().await {
            Ok(driver) => driver,
            Err(e) => return (Err(e), trace, None),
        };

        let page = Page::new(Arc::clone(&driver), self.config.base_url.clone())
            .with_settings(self.config.page_settings());
        let ctx = ScenarioContext::new(page, ApiClient::new(self.config.api_url()), trace)
            .with_step_logging(self.config.log_steps);

        let limit = self.config.scenario_timeout();
        let outcome = match tokio::time::timeout(limit, scenario.run(&ctx)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ShopError::ScenarioTimeout {
                name: scenario.id(),
                ms: self.config.scenario_timeout_ms,
            }),
        };

        let screenshot = if outcome.is_err() && self.config.screenshot_on_failure {
            self.save_screenshot(scenario, driver.as_ref()).await
        } else {
            None
        };
        if let Err(e) = driver.close().await {
            warn!(error = %e, "closing page failed");
        }
        (outcome, ctx.trace(), screenshot)
    }

    /// Save a failure screenshot; returns its path relative to the output dir
    async fn save_screenshot(&self, scenario: &Scenario, driver: &dyn Driver) -> Option<PathBuf> {
        let relative = Path::new(SCREENSHOT_DIR).join(format!("{}.png", scenario.slug()));
        let saved = match driver.screenshot().await {
            Ok(shot) => shot.save(&self.output(&relative)),
            Err(e) => Err(e),
        };
        match saved {
            Ok(()) => {
                debug!(path = %relative.display(), "saved failure screenshot");
                Some(relative)
            }
            Err(e) => {
                warn!(error = %e, "failure screenshot not saved");
                None
            }
        }
    }

    fn save_trace(&self, scenario: &Scenario, trace: &TraceData) -> Option<PathBuf> {
        let relative = Path::new(TRACE_DIR).join(format!("{}.json", scenario.slug()));
        match trace.save(&self.output(&relative)) {
            Ok(()) => Some(relative),
            Err(e) => {
                warn!(error = %e, "trace not saved");
                None
            }
        }
    }
}

//! Reporter: scenario results, step traces and report files.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Reporter                                                        │
//! │                                                                  │
//! │  record(ScenarioResult) ──► results ──► report.html              │
//! │        │                          ├──► junit.xml                 │
//! │        │                          └──► results.json              │
//! │        ▼                                                         │
//! │  FailureMode::FailFast    stop the run on the first failure      │
//! │  FailureMode::CollectAll  keep going, report everything          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Screenshots and step traces are written by the runner next to the
//! reports (`screenshots/`, `traces/`); results only carry their paths.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::{ShopError, ShopResult};

/// HTML report file name inside the output directory
pub const HTML_REPORT: &str = "report.html";
/// JUnit XML file name inside the output directory
pub const JUNIT_REPORT: &str = "junit.xml";
/// JSON results file name inside the output directory
pub const JSON_REPORT: &str = "results.json";

/// What to do after a failing scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Stop on the first failure
    FailFast,
    /// Run everything and collect all failures
    #[default]
    CollectAll,
}

/// Outcome of a scenario or a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    /// Not run because the run stopped early
    Skipped,
}

impl TestStatus {
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    const fn css_class(self) -> &'static str {
        match self {
            Self::Passed => "pass",
            Self::Failed => "fail",
            Self::Skipped => "skip",
        }
    }
}

/// One named step of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Step-by-step trace of one scenario attempt, saved as `traces/<scenario>.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceData {
    pub scenario: String,
    pub attempt: u32,
    pub steps: Vec<StepRecord>,
}

impl TraceData {
    #[must_use]
    pub fn new(scenario: impl Into<String>, attempt: u32) -> Self {
        Self {
            scenario: scenario.into(),
            attempt,
            steps: Vec::new(),
        }
    }

    /// Record a finished step
    pub fn add_step(&mut self, name: impl Into<String>, duration: Duration, error: Option<String>) {
        let status = if error.is_some() {
            TestStatus::Failed
        } else {
            TestStatus::Passed
        };
        self.steps.push(StepRecord {
            name: name.into(),
            status,
            duration_ms: duration_ms(duration),
            error,
        });
    }

    /// Sum of step durations
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        Duration::from_millis(self.steps.iter().map(|s| s.duration_ms).sum())
    }

    /// The step that failed, if any
    #[must_use]
    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.status.is_failed())
    }

    /// Write the trace as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&self, path: &Path) -> ShopResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Final result of one scenario, after retries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub suite: String,
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    /// Attempts made, including the first
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure screenshot, relative to the output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
    /// Step trace, relative to the output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<PathBuf>,
    /// Steps of the last attempt
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    pub finished_at: DateTime<Utc>,
}

impl ScenarioResult {
    #[must_use]
    pub fn passed(suite: impl Into<String>, name: impl Into<String>, duration: Duration) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
            status: TestStatus::Passed,
            duration_ms: duration_ms(duration),
            attempts: 1,
            error: None,
            screenshot: None,
            trace: None,
            steps: Vec::new(),
            finished_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn failed(
        suite: impl Into<String>,
        name: impl Into<String>,
        duration: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status: TestStatus::Failed,
            error: Some(error.into()),
            ..Self::passed(suite, name, duration)
        }
    }

    #[must_use]
    pub fn skipped(suite: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            status: TestStatus::Skipped,
            attempts: 0,
            ..Self::passed(suite, name, Duration::ZERO)
        }
    }

    #[must_use]
    pub const fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot = Some(path.into());
        self
    }

    /// Attach the last attempt's trace and where it was saved
    #[must_use]
    pub fn with_trace(mut self, trace: &TraceData, path: impl Into<PathBuf>) -> Self {
        self.steps = trace.steps.clone();
        self.trace = Some(path.into());
        self
    }

    /// `suite / name`
    #[must_use]
    pub fn id(&self) -> String {
        format!("{} / {}", self.suite, self.name)
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Everything `results.json` holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<ScenarioResult>,
}

impl RunReport {
    /// Read a `results.json` written by an earlier run
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing or not a run report
    pub fn load(path: &Path) -> ShopResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// One line per scenario, then the totals
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for r in &self.results {
            let _ = writeln!(
                out,
                "{:<7} {} ({}ms)",
                format!("{:?}", r.status).to_uppercase(),
                r.id(),
                r.duration_ms
            );
        }
        let _ = write!(
            out,
            "{}: {} passed, {} failed, {} skipped",
            self.name, self.passed, self.failed, self.skipped
        );
        out
    }
}

/// Collects scenario results and renders the reports
#[derive(Debug)]
pub struct Reporter {
    results: Vec<ScenarioResult>,
    failure_mode: FailureMode,
    run_name: String,
    started_at: DateTime<Utc>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(FailureMode::default())
    }
}

impl Reporter {
    #[must_use]
    pub fn new(failure_mode: FailureMode) -> Self {
        Self {
            results: Vec::new(),
            failure_mode,
            run_name: "shopcheck".to_string(),
            started_at: Utc::now(),
        }
    }

    /// Reporter that stops the run on the first failure
    #[must_use]
    pub fn fail_fast() -> Self {
        Self::new(FailureMode::FailFast)
    }

    #[must_use]
    pub fn collect_all() -> Self {
        Self::new(FailureMode::CollectAll)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.run_name = name.into();
        self
    }

    #[must_use]
    pub const fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    /// Mark the start of the run
    pub fn start(&mut self) {
        self.started_at = Utc::now();
    }

    /// Record a scenario result
    ///
    /// # Errors
    ///
    /// In fail-fast mode, returns `AssertionFailed` for a failed scenario;
    /// the caller stops the run
    pub fn record(&mut self, result: ScenarioResult) -> ShopResult<()> {
        let failure = result
            .status
            .is_failed()
            .then(|| (result.id(), result.error.clone().unwrap_or_default()));
        self.results.push(result);

        match failure {
            Some((id, message)) if self.failure_mode == FailureMode::FailFast => {
                Err(ShopError::assertion(format!(
                    "fail-fast: scenario '{id}' failed: {message}"
                )))
            }
            _ => Ok(()),
        }
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Passed share of the scenarios that ran (0.0 to 1.0)
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let ran = self.passed_count() + self.failed_count();
        if ran == 0 {
            return 1.0;
        }
        self.passed_count() as f64 / ran as f64
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(ScenarioResult::duration).sum()
    }

    #[must_use]
    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results
            .iter()
            .filter(|r| r.status.is_failed())
            .collect()
    }

    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} passed ({:.1}%), {} skipped",
            self.run_name,
            self.passed_count(),
            self.passed_count() + self.failed_count(),
            self.pass_rate() * 100.0,
            self.skipped_count()
        )
    }

    /// Snapshot for `results.json`
    #[must_use]
    pub fn to_report(&self) -> RunReport {
        RunReport {
            name: self.run_name.clone(),
            started_at: self.started_at,
            duration_ms: duration_ms(self.total_duration()),
            passed: self.passed_count(),
            failed: self.failed_count(),
            skipped: self.skipped_count(),
            results: self.results.clone(),
        }
    }

    /// Write `report.html`, `junit.xml` and `results.json` into `dir`
    ///
    /// # Errors
    ///
    /// Returns error if the directory or a file cannot be written
    pub fn write_all(&self, dir: &Path) -> ShopResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let html = dir.join(HTML_REPORT);
        std::fs::write(&html, self.render_html())?;
        std::fs::write(dir.join(JUNIT_REPORT), self.render_junit())?;
        std::fs::write(
            dir.join(JSON_REPORT),
            serde_json::to_string_pretty(&self.to_report())?,
        )?;
        Ok(html)
    }

    /// Render the HTML report
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        html.push_str(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>shopcheck report</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .progress-bar { background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }
        .passed { background: #4caf50; height: 100%; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .test.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .test.skip { background: #fff3e0; border-left: 4px solid #ff9800; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
        .steps { font-size: 0.9em; margin: 6px 0 0 20px; }
        .steps .fail { color: #d32f2f; }
        .screenshot img { max-width: 480px; border: 1px solid #ddd; margin-top: 8px; }
    </style>
</head>
<body>
"#,
        );

        let _ = write!(
            html,
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>Results: {}/{} passed ({:.1}%), {} skipped</h2>
    <div class="progress-bar">
        <div class="passed" style="width: {:.1}%"></div>
    </div>
    <p>Started {} &middot; duration {:.2}s</p>
</div>
"#,
            escape_xml(&self.run_name),
            self.passed_count(),
            self.passed_count() + self.failed_count(),
            self.pass_rate() * 100.0,
            self.skipped_count(),
            self.pass_rate() * 100.0,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.total_duration().as_secs_f64()
        );

        html.push_str("<h2>Scenarios</h2>\n");
        for result in &self.results {
            let retried = if result.attempts > 1 {
                format!(", {} attempts", result.attempts)
            } else {
                String::new()
            };
            let _ = writeln!(
                html,
                r#"<div class="test {}">
    <strong>{}</strong> - {:?} ({}ms{})"#,
                result.status.css_class(),
                escape_xml(&result.id()),
                result.status,
                result.duration_ms,
                retried
            );

            if let Some(error) = &result.error {
                let _ = writeln!(html, r#"    <div class="error">{}</div>"#, escape_xml(error));
            }

            if !result.steps.is_empty() {
                html.push_str("    <ol class=\"steps\">\n");
                for step in &result.steps {
                    let _ = writeln!(
                        html,
                        r#"        <li class="{}">{} ({}ms)</li>"#,
                        step.status.css_class(),
                        escape_xml(&step.name),
                        step.duration_ms
                    );
                }
                html.push_str("    </ol>\n");
            }

            if let Some(shot) = &result.screenshot {
                let src = escape_xml(&shot.display().to_string());
                let _ = writeln!(
                    html,
                    r#"    <div class="screenshot"><a href="{src}"><img src="{src}" alt="failure screenshot"></a></div>"#
                );
            }

            html.push_str("</div>\n");
        }

        html.push_str(
            r#"
<footer>
    <p>Generated by shopcheck</p>
</footer>
</body>
</html>
"#,
        );

        html
    }

    /// Render JUnit XML, one `<testsuite>` per scenario suite
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        let _ = writeln!(
            xml,
            r#"<testsuites name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
            escape_xml(&self.run_name),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        );

        let mut suites: Vec<&str> = Vec::new();
        for r in &self.results {
            if !suites.contains(&r.suite.as_str()) {
                suites.push(&r.suite);
            }
        }

        for suite in suites {
            let members: Vec<&ScenarioResult> =
                self.results.iter().filter(|r| r.suite == suite).collect();
            let failures = members.iter().filter(|r| r.status.is_failed()).count();
            let skipped = members
                .iter()
                .filter(|r| r.status == TestStatus::Skipped)
                .count();
            let time: Duration = members.iter().map(|r| r.duration()).sum();
            let _ = writeln!(
                xml,
                r#"  <testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
                escape_xml(suite),
                members.len(),
                failures,
                skipped,
                time.as_secs_f64()
            );

            for result in members {
                let _ = writeln!(
                    xml,
                    r#"    <testcase classname="{}" name="{}" time="{:.3}">"#,
                    escape_xml(&result.suite),
                    escape_xml(&result.name),
                    result.duration().as_secs_f64()
                );
                match (result.status, &result.error) {
                    (TestStatus::Failed, error) => {
                        let message = error.as_deref().unwrap_or("failed");
                        let _ = writeln!(
                            xml,
                            r#"      <failure message="{}">{}</failure>"#,
                            escape_xml(message),
                            escape_xml(message)
                        );
                    }
                    (TestStatus::Skipped, _) => xml.push_str("      <skipped/>\n"),
                    (TestStatus::Passed, _) => {}
                }
                xml.push_str("    </testcase>\n");
            }
            xml.push_str("  </testsuite>\n");
        }

        xml.push_str("</testsuites>\n");
        xml
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Escape XML/HTML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

//! Suite configuration: defaults, `shopcheck.yaml`, environment overrides.
//!
//! Precedence, lowest first: built-in defaults, the YAML file, environment
//! variables, then whatever the CLI sets on the loaded value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::browser::BrowserConfig;
use crate::page::PageSettings;
use crate::reporter::FailureMode;
use crate::result::{ShopError, ShopResult};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "shopcheck.yaml";

/// Public demo storefront
pub const DEFAULT_BASE_URL: &str = "https://automationexercise.com";

pub const ENV_BASE_URL: &str = "SHOPCHECK_BASE_URL";
pub const ENV_API_URL: &str = "SHOPCHECK_API_URL";
pub const ENV_HEADLESS: &str = "SHOPCHECK_HEADLESS";
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";

/// Browser window size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Settings for one run of the suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuiteConfig {
    /// Storefront root, e.g. `https://automationexercise.com`
    pub base_url: String,
    /// Root for `/api/*` calls; the storefront root when unset
    pub api_base_url: Option<String>,
    pub headless: bool,
    /// Pause after every page action
    pub slow_mo_ms: u64,
    /// Auto-wait bound for actions and assertions
    pub action_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    /// Hard limit for one scenario attempt
    pub scenario_timeout_ms: u64,
    /// Extra attempts for a failed scenario
    pub retries: u32,
    /// Parallel workers; only 1 is supported
    pub workers: usize,
    pub viewport: Viewport,
    /// Reports, screenshots and traces go here
    pub output_dir: PathBuf,
    pub chromium_path: Option<PathBuf>,
    /// Launch Chromium with `--no-sandbox` (containers)
    pub no_sandbox: bool,
    pub screenshot_on_failure: bool,
    pub fail_fast: bool,
    /// Open DevTools next to every page
    pub devtools: bool,
    /// Log every scenario step at `info`
    pub log_steps: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_base_url: None,
            headless: true,
            slow_mo_ms: 0,
            action_timeout_ms: 10_000,
            navigation_timeout_ms: 30_000,
            scenario_timeout_ms: 120_000,
            retries: 0,
            workers: 1,
            viewport: Viewport::default(),
            output_dir: PathBuf::from("shopcheck-report"),
            chromium_path: None,
            no_sandbox: false,
            screenshot_on_failure: true,
            fail_fast: false,
            devtools: false,
            log_steps: false,
        }
    }
}

impl SuiteConfig {
    /// Parse a YAML document; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Yaml` for malformed YAML or unknown keys
    pub fn from_yaml(text: &str) -> ShopResult<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Read a config file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: &Path) -> ShopResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ShopError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_yaml(&text)
    }

    /// Load `path`, or `shopcheck.yaml` if it exists, or the defaults; then
    /// apply environment overrides
    ///
    /// # Errors
    ///
    /// Returns error if an explicit file is missing, any file is malformed,
    /// or an environment variable has an unusable value
    pub fn load(path: Option<&Path>) -> ShopResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Config` if `SHOPCHECK_HEADLESS` is not a boolean
    pub fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) -> ShopResult<()> {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(url) = get(ENV_API_URL) {
            self.api_base_url = Some(url);
        }
        if let Some(raw) = get(ENV_HEADLESS) {
            self.headless = parse_bool(&raw).ok_or_else(|| {
                ShopError::config(format!("{ENV_HEADLESS} must be true or false, got '{raw}'"))
            })?;
        }
        if let Some(path) = get(ENV_CHROMIUM_PATH) {
            self.chromium_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Check the values make sense together
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Config` naming the first bad field
    pub fn validate(&self) -> ShopResult<()> {
        if self.workers != 1 {
            return Err(ShopError::config(format!(
                "workers must be 1: scenarios share remote account state (got {})",
                self.workers
            )));
        }
        for (field, url) in [
            ("base_url", Some(self.base_url.as_str())),
            ("api_base_url", self.api_base_url.as_deref()),
        ] {
            if let Some(url) = url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ShopError::config(format!(
                        "{field} must be an http(s) URL, got '{url}'"
                    )));
                }
            }
        }
        for (field, value) in [
            ("action_timeout_ms", self.action_timeout_ms),
            ("navigation_timeout_ms", self.navigation_timeout_ms),
            ("scenario_timeout_ms", self.scenario_timeout_ms),
        ] {
            if value == 0 {
                return Err(ShopError::config(format!("{field} must be greater than 0")));
            }
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ShopError::config("viewport must be non-empty"));
        }
        Ok(())
    }

    /// Visible browser, slow motion, DevTools, step logging, stop on first failure
    pub fn enable_debug(&mut self) {
        self.headless = false;
        if self.slow_mo_ms == 0 {
            self.slow_mo_ms = 250;
        }
        self.devtools = true;
        self.log_steps = true;
        self.fail_fast = true;
    }

    /// Root for API calls
    #[must_use]
    pub fn api_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(&self.base_url)
    }

    #[must_use]
    pub const fn scenario_timeout(&self) -> Duration {
        Duration::from_millis(self.scenario_timeout_ms)
    }

    #[must_use]
    pub const fn failure_mode(&self) -> FailureMode {
        if self.fail_fast {
            FailureMode::FailFast
        } else {
            FailureMode::CollectAll
        }
    }

    #[must_use]
    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            action_timeout: Duration::from_millis(self.action_timeout_ms),
            navigation_timeout: Duration::from_millis(self.navigation_timeout_ms),
            slow_mo: Duration::from_millis(self.slow_mo_ms),
            ..PageSettings::default()
        }
    }

    #[must_use]
    pub fn browser_config(&self) -> BrowserConfig {
        let mut config = BrowserConfig::default()
            .with_headless(self.headless)
            .with_viewport(self.viewport.width, self.viewport.height)
            .with_devtools(self.devtools);
        if let Some(path) = &self.chromium_path {
            config = config.with_chromium_path(path.display().to_string());
        }
        if self.no_sandbox {
            config = config.with_no_sandbox();
        }
        config
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod load_tests {
        use super::*;

        #[test]
        fn test_defaults_are_valid() {
            let config = SuiteConfig::default();
            config.validate().unwrap();
            assert_eq!(config.api_url(), DEFAULT_BASE_URL);
            assert_eq!(config.failure_mode(), FailureMode::CollectAll);
        }

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = SuiteConfig::from_yaml(
                "base_url: http://localhost:8080\nretries: 2\nviewport:\n  width: 800\n  height: 600\n",
            )
            .unwrap();
            assert_eq!(config.base_url, "http://localhost:8080");
            assert_eq!(config.retries, 2);
            assert_eq!(config.viewport, Viewport { width: 800, height: 600 });
            assert!(config.headless);
            assert_eq!(config.action_timeout_ms, 10_000);
        }

        #[test]
        fn test_unknown_key_rejected() {
            assert!(SuiteConfig::from_yaml("paralel: 3\n").is_err());
        }

        #[test]
        fn test_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("shopcheck.yaml");
            std::fs::write(&path, "fail_fast: true\nslow_mo_ms: 50\n").unwrap();
            let config = SuiteConfig::load(Some(&path)).unwrap();
            assert!(config.fail_fast);
            assert_eq!(config.page_settings().slow_mo, Duration::from_millis(50));
        }

        #[test]
        fn test_missing_explicit_file() {
            let dir = tempfile::tempdir().unwrap();
            let err = SuiteConfig::from_file(&dir.path().join("nope.yaml")).unwrap_err();
            assert!(err.to_string().contains("nope.yaml"));
        }
    }

    mod env_tests {
        use super::*;

        #[test]
        fn test_env_overrides() {
            let mut config = SuiteConfig::default();
            config
                .apply_env_from(env(&[
                    (ENV_BASE_URL, "http://127.0.0.1:3000"),
                    (ENV_API_URL, "http://127.0.0.1:3001"),
                    (ENV_HEADLESS, "false"),
                    (ENV_CHROMIUM_PATH, "/usr/bin/chromium"),
                ]))
                .unwrap();
            assert_eq!(config.base_url, "http://127.0.0.1:3000");
            assert_eq!(config.api_url(), "http://127.0.0.1:3001");
            assert!(!config.headless);
            assert_eq!(
                config.browser_config().chromium_path.as_deref(),
                Some("/usr/bin/chromium")
            );
        }

        #[test]
        fn test_blank_values_ignored() {
            let mut config = SuiteConfig::default();
            config.apply_env_from(env(&[(ENV_BASE_URL, "  ")])).unwrap();
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
        }

        #[test]
        fn test_bad_headless_value() {
            let mut config = SuiteConfig::default();
            let err = config
                .apply_env_from(env(&[(ENV_HEADLESS, "maybe")]))
                .unwrap_err();
            assert!(err.to_string().contains("SHOPCHECK_HEADLESS"));
        }
    }

    mod validate_tests {
        use super::*;

        #[test]
        fn test_workers_must_be_one() {
            let config = SuiteConfig {
                workers: 4,
                ..SuiteConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("workers must be 1"));
        }

        #[test]
        fn test_url_scheme_checked() {
            let config = SuiteConfig {
                api_base_url: Some("ftp://example.com".to_string()),
                ..SuiteConfig::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_zero_timeout_rejected() {
            let config = SuiteConfig {
                scenario_timeout_ms: 0,
                ..SuiteConfig::default()
            };
            assert!(config.validate().unwrap_err().to_string().contains("scenario_timeout_ms"));
        }
    }

    mod derived_tests {
        use super::*;

        #[test]
        fn test_enable_debug() {
            let mut config = SuiteConfig::default();
            config.enable_debug();
            assert!(!config.headless);
            assert!(config.devtools);
            assert!(config.log_steps);
            assert_eq!(config.failure_mode(), FailureMode::FailFast);
            assert_eq!(config.slow_mo_ms, 250);
        }

        #[test]
        fn test_browser_config() {
            let config = SuiteConfig {
                headless: false,
                no_sandbox: true,
                ..SuiteConfig::default()
            };
            let browser = config.browser_config();
            assert!(!browser.headless);
            assert!(!browser.sandbox);
            assert_eq!((browser.viewport_width, browser.viewport_height), (1280, 720));
        }
    }
}

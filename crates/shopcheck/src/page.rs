//! Page: a live page handle with auto-waiting actions and assertions.
//!
//! `Page` is what page objects hold. It is cheap to clone (an `Arc` to the
//! driver plus settings) and every action resolves its [`Locator`] to exactly
//! one visible element within the locator's timeout before acting.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::driver::{url_path, Driver, Screenshot};
use crate::locator::{ExpectAssertion, Locator};
use crate::page_object::UrlMatcher;
use crate::result::{ShopError, ShopResult};
use crate::wait::{poll_until, Probe, WaitOptions};

/// Timing knobs shared by every action on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSettings {
    /// Bounded wait for locators and assertions
    pub action_timeout: Duration,
    /// Bounded wait for URL changes
    pub navigation_timeout: Duration,
    /// Polling interval while waiting
    pub poll_interval: Duration,
    /// Pause before every action (debug mode)
    pub slow_mo: Duration,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            action_timeout: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
            slow_mo: Duration::ZERO,
        }
    }
}

impl PageSettings {
    /// Wait options bounded by `timeout`, polling at this page's interval
    #[must_use]
    pub fn wait_options(&self, timeout: Duration) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout.as_millis() as u64)
            .with_poll_interval(self.poll_interval.as_millis() as u64)
    }
}

/// A browser page bound to the storefront's base URL
#[derive(Debug, Clone)]
pub struct Page {
    driver: Arc<dyn Driver>,
    base_url: String,
    settings: PageSettings,
}

impl Page {
    /// Wrap a driver
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>, base_url: impl Into<String>) -> Self {
        Self {
            driver,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            settings: PageSettings::default(),
        }
    }

    /// Replace the timing settings
    #[must_use]
    pub const fn with_settings(mut self, settings: PageSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Timing settings
    #[must_use]
    pub const fn settings(&self) -> &PageSettings {
        &self.settings
    }

    /// Base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// Absolute URL for a site path
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.contains("://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Navigate to a site path or absolute URL
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` if the driver cannot load the page
    pub async fn goto(&self, path: &str) -> ShopResult<()> {
        let url = self.url_for(path);
        debug!(%url, "goto");
        self.driver.navigate(&url).await
    }

    /// Current URL
    ///
    /// # Errors
    ///
    /// Returns error if the driver cannot report the URL
    pub async fn current_url(&self) -> ShopResult<String> {
        self.driver.current_url().await
    }

    /// Path of the current URL
    ///
    /// # Errors
    ///
    /// Returns error if the driver cannot report the URL
    pub async fn current_path(&self) -> ShopResult<String> {
        Ok(url_path(&self.driver.current_url().await?))
    }

    async fn pace(&self) {
        if !self.settings.slow_mo.is_zero() {
            tokio::time::sleep(self.settings.slow_mo).await;
        }
    }

    fn timeout_for(&self, locator: &Locator) -> Duration {
        // Locators built with the library default follow the page setting
        let own = locator.options().timeout;
        if own == crate::locator::LocatorOptions::default().timeout {
            self.settings.action_timeout
        } else {
            own
        }
    }

    /// Wait until the locator resolves to one visible element; return its index
    async fn resolve(&self, locator: &Locator) -> ShopResult<usize> {
        let options = self.settings.wait_options(self.timeout_for(locator));
        let what = format!("{locator} to be visible");
        let driver = &self.driver;
        poll_until(options, &what, move || async move {
            let count = driver.count_visible(locator.selector()).await?;
            Ok(match locator.pick(count)? {
                Some(index) => Probe::Ready(index),
                None => Probe::Pending(format!("{count} visible matches")),
            })
        })
        .await
    }

    /// Click the element
    ///
    /// # Errors
    ///
    /// Returns `Timeout`/`StrictModeViolation` if the locator does not resolve
    pub async fn click(&self, locator: &Locator) -> ShopResult<()> {
        let index = self.resolve(locator).await?;
        self.pace().await;
        debug!(%locator, "click");
        self.driver.click(locator.selector(), index).await
    }

    /// Replace the value of an input
    ///
    /// # Errors
    ///
    /// Returns `Timeout`/`StrictModeViolation` if the locator does not resolve
    pub async fn fill(&self, locator: &Locator, value: &str) -> ShopResult<()> {
        let index = self.resolve(locator).await?;
        self.pace().await;
        debug!(%locator, "fill");
        self.driver.fill(locator.selector(), index, value).await
    }

    /// Select an option by value or label
    ///
    /// # Errors
    ///
    /// Returns `Timeout`/`StrictModeViolation` if the locator does not resolve
    pub async fn select_option(&self, locator: &Locator, value: &str) -> ShopResult<()> {
        let index = self.resolve(locator).await?;
        self.pace().await;
        debug!(%locator, value, "select");
        self.driver.select_option(locator.selector(), index, value).await
    }

    /// Check a checkbox or radio button
    ///
    /// # Errors
    ///
    /// Returns `Timeout`/`StrictModeViolation` if the locator does not resolve
    pub async fn check(&self, locator: &Locator) -> ShopResult<()> {
        self.set_checked(locator, true).await
    }

    /// Uncheck a checkbox
    ///
    /// # Errors
    ///
    /// Returns `Timeout`/`StrictModeViolation` if the locator does not resolve
    pub async fn uncheck(&self, locator: &Locator) -> ShopResult<()> {
        self.set_checked(locator, false).await
    }

    async fn set_checked(&self, locator: &Locator, checked: bool) -> ShopResult<()> {
        let index = self.resolve(locator).await?;
        self.pace().await;
        debug!(%locator, checked, "set_checked");
        self.driver
            .set_checked(locator.selector(), index, checked)
            .await
    }

    /// Attach a file to a file input
    ///
    /// # Errors
    ///
    /// Returns `Timeout`/`StrictModeViolation` if the locator does not resolve
    pub async fn set_input_files(&self, locator: &Locator, path: &Path) -> ShopResult<()> {
        let index = self.resolve(locator).await?;
        self.pace().await;
        debug!(%locator, file = %path.display(), "upload");
        self.driver
            .set_input_files(locator.selector(), index, path)
            .await
    }

    /// Text content of the element, trimmed
    ///
    /// # Errors
    ///
    /// Returns `Timeout`/`StrictModeViolation` if the locator does not resolve
    pub async fn text_content(&self, locator: &Locator) -> ShopResult<String> {
        let index = self.resolve(locator).await?;
        let texts = self.driver.texts(locator.selector()).await?;
        texts
            .get(index)
            .map(|t| t.trim().to_string())
            .ok_or_else(|| ShopError::ElementNotFound {
                selector: locator.to_string(),
            })
    }

    /// Text of every visible match, trimmed; does not wait
    ///
    /// # Errors
    ///
    /// Returns error if the driver query fails
    pub async fn all_texts(&self, locator: &Locator) -> ShopResult<Vec<String>> {
        Ok(self
            .driver
            .texts(locator.selector())
            .await?
            .into_iter()
            .map(|t| t.trim().to_string())
            .collect())
    }

    /// Current value of a form control
    ///
    /// # Errors
    ///
    /// Returns `Timeout`/`StrictModeViolation` if the locator does not resolve
    pub async fn input_value(&self, locator: &Locator) -> ShopResult<String> {
        let index = self.resolve(locator).await?;
        self.driver.value(locator.selector(), index).await
    }

    /// Number of visible matches; does not wait
    ///
    /// # Errors
    ///
    /// Returns error if the driver query fails
    pub async fn count(&self, locator: &Locator) -> ShopResult<usize> {
        self.driver.count_visible(locator.selector()).await
    }

    /// Whether at least one match is visible right now
    ///
    /// # Errors
    ///
    /// Returns error if the driver query fails
    pub async fn is_visible(&self, locator: &Locator) -> ShopResult<bool> {
        Ok(self.count(locator).await? > 0)
    }

    /// Accept `confirm()` dialogs raised by the current document
    ///
    /// # Errors
    ///
    /// Returns error if the driver cannot install the handler
    pub async fn accept_dialogs(&self) -> ShopResult<()> {
        self.driver.accept_dialogs().await
    }

    /// Capture a screenshot
    ///
    /// # Errors
    ///
    /// Returns `ScreenshotError` if capture fails
    pub async fn screenshot(&self) -> ShopResult<Screenshot> {
        self.driver.screenshot().await
    }

    /// Start an assertion on a locator
    #[must_use]
    pub fn expect<'a>(&'a self, locator: &'a Locator) -> Expect<'a> {
        Expect {
            page: self,
            locator,
            timeout: self.timeout_for(locator),
        }
    }

    /// Wait until the current path matches `pattern` (see [`UrlMatcher`])
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` naming the last seen URL on timeout
    pub async fn expect_path(&self, pattern: &str) -> ShopResult<()> {
        let matcher = UrlMatcher::new(pattern);
        let options = self.settings.wait_options(self.settings.navigation_timeout);
        let what = format!("URL to match {pattern}");
        let driver = &self.driver;
        let matcher = &matcher;
        poll_until(options, &what, move || async move {
            let url = driver.current_url().await?;
            Ok(if matcher.matches(&url_path(&url)) {
                Probe::Ready(())
            } else {
                Probe::Pending(format!("at {url}"))
            })
        })
        .await
        .map_err(timeout_to_assertion)
    }
}

fn timeout_to_assertion(err: ShopError) -> ShopError {
    match err {
        ShopError::Timeout { ms, waited_for } => ShopError::AssertionFailed {
            message: format!("expected {waited_for} within {ms}ms"),
        },
        other => other,
    }
}

/// Auto-retrying assertion on a locator (`expect(locator).to_be_visible()`)
#[derive(Debug)]
pub struct Expect<'a> {
    page: &'a Page,
    locator: &'a Locator,
    timeout: Duration,
}

impl Expect<'_> {
    /// Override the assertion timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn check(self, assertion: ExpectAssertion) -> ShopResult<()> {
        let options = self.page.settings.wait_options(self.timeout);
        let what = format!("{} {}", self.locator, assertion.describe());
        let driver = &self.page.driver;
        let locator = self.locator;
        let assertion = &assertion;
        poll_until(options, &what, move || async move {
            let observed = observe(&**driver, locator, assertion).await?;
            Ok(match observed {
                Ok(()) => Probe::Ready(()),
                Err(mismatch) => Probe::Pending(mismatch),
            })
        })
        .await
        .map_err(timeout_to_assertion)
    }

    /// Element is visible
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if not observed within the timeout
    pub async fn to_be_visible(self) -> ShopResult<()> {
        self.check(ExpectAssertion::IsVisible).await
    }

    /// Element is hidden or absent
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if not observed within the timeout
    pub async fn to_be_hidden(self) -> ShopResult<()> {
        self.check(ExpectAssertion::IsHidden).await
    }

    /// Element text equals `expected` (trimmed)
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if not observed within the timeout
    pub async fn to_have_text(self, expected: impl Into<String>) -> ShopResult<()> {
        self.check(ExpectAssertion::HasText {
            expected: expected.into(),
        })
        .await
    }

    /// Element text contains `expected`
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if not observed within the timeout
    pub async fn to_contain_text(self, expected: impl Into<String>) -> ShopResult<()> {
        self.check(ExpectAssertion::ContainsText {
            expected: expected.into(),
        })
        .await
    }

    /// Exactly `expected` visible matches
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if not observed within the timeout
    pub async fn to_have_count(self, expected: usize) -> ShopResult<()> {
        self.check(ExpectAssertion::HasCount { expected }).await
    }

    /// Form control value equals `expected`
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if not observed within the timeout
    pub async fn to_have_value(self, expected: impl Into<String>) -> ShopResult<()> {
        self.check(ExpectAssertion::HasValue {
            expected: expected.into(),
        })
        .await
    }
}

/// One observation for an assertion: `Ok(Ok(()))` passes, `Ok(Err(why))` is
/// a mismatch worth waiting on, `Err` aborts unless it is transient.
async fn observe(
    driver: &dyn Driver,
    locator: &Locator,
    assertion: &ExpectAssertion,
) -> ShopResult<Result<(), String>> {
    let count = driver.count_visible(locator.selector()).await?;
    match assertion {
        ExpectAssertion::IsVisible | ExpectAssertion::IsHidden | ExpectAssertion::HasCount { .. } => {
            let relevant = match (assertion, locator.index()) {
                (ExpectAssertion::HasCount { .. }, _) | (_, None) => count,
                (_, Some(i)) => usize::from(count > i),
            };
            Ok(assertion
                .validate_count(relevant)
                .map_err(|e| e.to_string()))
        }
        ExpectAssertion::HasValue { .. } => match locator.pick(count)? {
            Some(index) => {
                let value = driver.value(locator.selector(), index).await?;
                Ok(assertion.validate(&value).map_err(|e| e.to_string()))
            }
            None => Ok(Err(format!("{count} visible matches"))),
        },
        ExpectAssertion::HasText { .. } | ExpectAssertion::ContainsText { .. } => {
            match locator.pick(count)? {
                Some(index) => {
                    let texts = driver.texts(locator.selector()).await?;
                    let text = texts.get(index).map_or("", String::as_str);
                    Ok(assertion.validate(text).map_err(|e| e.to_string()))
                }
                None => Ok(Err(format!("{count} visible matches"))),
            }
        }
    }
}

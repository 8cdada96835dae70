//! Driver - the browser automation seam.
//!
//! Page objects never talk to Chromium directly. They go through
//! [`crate::Page`], which talks to a [`Driver`]:
//!
//! ```text
//! ┌──────────────┐     ┌──────────┐     ┌──────────────────────────────┐
//! │ Page objects │────►│   Page   │────►│ Driver (trait)               │
//! │ + flows      │     │ auto-wait│     │  ├─ ChromiumDriver (CDP)     │
//! └──────────────┘     └──────────┘     │  └─ MockDriver (in-memory)   │
//!                                       └──────────────────────────────┘
//! ```
//!
//! Driver calls are single-shot: they report what the page looks like right
//! now and never wait. Waiting lives in [`crate::wait`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::locator::Selector;
use crate::result::{ShopError, ShopResult};

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Timestamp when screenshot was taken
    pub timestamp: std::time::SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp: std::time::SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if screenshot has data
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }

    /// Write the PNG to disk, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&self, path: &Path) -> ShopResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}

/// Single-shot browser operations.
///
/// `index` arguments address the n-th *visible* match of the selector.
#[async_trait]
pub trait Driver: Send + Sync + fmt::Debug {
    /// Navigate to an absolute URL and wait for the load event
    async fn navigate(&self, url: &str) -> ShopResult<()>;

    /// Current document URL
    async fn current_url(&self) -> ShopResult<String>;

    /// Number of visible elements matching the selector
    async fn count_visible(&self, selector: &Selector) -> ShopResult<usize>;

    /// Text content of every visible match, in document order
    async fn texts(&self, selector: &Selector) -> ShopResult<Vec<String>>;

    /// Current value of a form control
    async fn value(&self, selector: &Selector, index: usize) -> ShopResult<String>;

    /// Click an element
    async fn click(&self, selector: &Selector, index: usize) -> ShopResult<()>;

    /// Replace the value of an input or textarea
    async fn fill(&self, selector: &Selector, index: usize, value: &str) -> ShopResult<()>;

    /// Choose an `<option>` by value or label
    async fn select_option(&self, selector: &Selector, index: usize, value: &str)
        -> ShopResult<()>;

    /// Set a checkbox or radio button
    async fn set_checked(&self, selector: &Selector, index: usize, checked: bool)
        -> ShopResult<()>;

    /// Attach a file to an `<input type=file>`
    async fn set_input_files(&self, selector: &Selector, index: usize, path: &Path)
        -> ShopResult<()>;

    /// Auto-accept `confirm()`/`alert()` dialogs raised by the current document
    async fn accept_dialogs(&self) -> ShopResult<()>;

    /// Evaluate a JavaScript expression
    async fn evaluate(&self, script: &str) -> ShopResult<serde_json::Value>;

    /// Capture a PNG of the viewport
    async fn screenshot(&self) -> ShopResult<Screenshot>;

    /// Close the underlying page
    async fn close(&self) -> ShopResult<()>;
}

/// Hands out a fresh [`Driver`] (one browser page) per scenario
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Open a new page
    async fn new_driver(&self) -> ShopResult<Arc<dyn Driver>>;
}

/// Factory that builds each driver by calling a closure
pub struct FnFactory<F>(pub F);

impl<F> fmt::Debug for FnFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnFactory")
    }
}

#[async_trait]
impl<F> DriverFactory for FnFactory<F>
where
    F: Fn() -> ShopResult<Arc<dyn Driver>> + Send + Sync,
{
    async fn new_driver(&self) -> ShopResult<Arc<dyn Driver>> {
        (self.0)()
    }
}

// ============================================================================
// MockDriver: an in-memory stand-in for the storefront
// ============================================================================

/// A fake element on a [`MockDriver`] page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Selector this element answers to
    pub selector: Selector,
    /// Text content
    pub text: String,
    /// Whether it is rendered
    pub visible: bool,
}

impl MockElement {
    /// Create a visible element
    #[must_use]
    pub fn new(selector: Selector, text: impl Into<String>) -> Self {
        Self {
            selector,
            text: text.into(),
            visible: true,
        }
    }

    /// Create a hidden element
    #[must_use]
    pub fn hidden(selector: Selector) -> Self {
        Self {
            selector,
            text: String::new(),
            visible: false,
        }
    }
}

/// Path key for elements rendered on every page (site header, footer)
pub const EVERY_PAGE: &str = "*";

/// Mutable state of the fake site, visible to click reactions
#[derive(Debug, Default)]
pub struct MockState {
    url: String,
    pages: HashMap<String, Vec<MockElement>>,
    values: HashMap<(Selector, usize), String>,
    checked: HashSet<(Selector, usize)>,
    files: HashMap<Selector, PathBuf>,
    /// Free-form store for reactions (e.g. registered emails)
    pub store: HashMap<String, String>,
    dialogs_accepted: bool,
    history: Vec<String>,
}

impl MockState {
    /// Path part of the current URL (no scheme, host or query)
    #[must_use]
    pub fn path(&self) -> String {
        url_path(&self.url)
    }

    /// Move to a path on the same origin
    pub fn go(&mut self, path: &str) {
        let origin = url_origin(&self.url);
        self.url = format!("{origin}{path}");
        self.dialogs_accepted = false;
        self.values.clear();
        self.checked.clear();
    }

    /// Add an element to the page at `path`
    pub fn show(&mut self, path: &str, element: MockElement) {
        self.pages.entry(path.to_string()).or_default().push(element);
    }

    /// Remove every element matching `selector` from the page at `path`
    pub fn remove(&mut self, path: &str, selector: &Selector) {
        if let Some(elements) = self.pages.get_mut(path) {
            elements.retain(|e| &e.selector != selector);
        }
    }

    /// Set the text of every element matching `selector` on `path`
    pub fn set_text(&mut self, path: &str, selector: &Selector, text: &str) {
        if let Some(elements) = self.pages.get_mut(path) {
            for e in elements.iter_mut().filter(|e| &e.selector == selector) {
                e.text = text.to_string();
            }
        }
    }

    /// Value last filled or selected into the first match of `selector`
    #[must_use]
    pub fn value_of(&self, selector: &Selector) -> Option<&str> {
        self.values
            .get(&(selector.clone(), 0))
            .map(String::as_str)
    }

    /// Whether the first match of `selector` is checked
    #[must_use]
    pub fn is_checked(&self, selector: &Selector) -> bool {
        self.checked.contains(&(selector.clone(), 0))
    }

    /// Whether dialogs were accepted on the current document
    #[must_use]
    pub const fn dialogs_accepted(&self) -> bool {
        self.dialogs_accepted
    }

    fn visible(&self, selector: &Selector) -> Vec<&MockElement> {
        let here = self.pages.get(&self.path()).into_iter().flatten();
        let everywhere = self.pages.get(EVERY_PAGE).into_iter().flatten();
        here.chain(everywhere)
            .filter(|e| e.visible && &e.selector == selector)
            .collect()
    }

    fn require(&self, selector: &Selector, index: usize) -> ShopResult<()> {
        if self.visible(selector).len() > index {
            Ok(())
        } else {
            Err(ShopError::ElementNotFound {
                selector: format!("{selector} >> nth={index}"),
            })
        }
    }
}

/// Reaction run when an element is clicked
pub type Reaction = Arc<dyn Fn(&mut MockState) + Send + Sync>;

/// In-memory [`Driver`] with scripted click reactions.
///
/// Elements are matched by selector equality, so tests describe the fake
/// site with the same selectors the page objects use.
#[derive(Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
    reactions: Mutex<HashMap<Selector, Reaction>>,
    failures: Mutex<Vec<(&'static str, ShopError)>>,
}

impl fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDriver")
            .field("url", &self.lock().url)
            .finish()
    }
}

impl MockDriver {
    /// Create an empty mock positioned at `about:blank`
    #[must_use]
    pub fn new() -> Self {
        let driver = Self::default();
        driver.lock().url = "about:blank".to_string();
        driver
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add a visible element to a page
    pub fn add_element(&self, path: &str, selector: Selector, text: impl Into<String>) {
        self.lock().show(path, MockElement::new(selector, text));
    }

    /// Register what happens when `selector` is clicked
    pub fn on_click<F>(&self, selector: Selector, reaction: F)
    where
        F: Fn(&mut MockState) + Send + Sync + 'static,
    {
        let _ = self
            .reactions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(selector, Arc::new(reaction));
    }

    /// Fail the next `op` call (`count_visible`, `texts` or `click`) with `error`
    pub fn fail_next(&self, op: &'static str, error: ShopError) {
        self.failures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((op, error));
    }

    fn injected_failure(&self, op: &str) -> ShopResult<()> {
        let mut failures = self
            .failures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match failures.iter().position(|(o, _)| *o == op) {
            Some(i) => Err(failures.remove(i).1),
            None => Ok(()),
        }
    }

    /// Run a closure against the state
    pub fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        f(&mut self.lock())
    }

    /// Recorded calls, e.g. `click:css=...`
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Whether any recorded call starts with `prefix`
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(prefix))
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn navigate(&self, url: &str) -> ShopResult<()> {
        let mut state = self.lock();
        state.history.push(format!("navigate:{url}"));
        state.url = url.to_string();
        state.dialogs_accepted = false;
        state.values.clear();
        state.checked.clear();
        Ok(())
    }

    async fn current_url(&self) -> ShopResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn count_visible(&self, selector: &Selector) -> ShopResult<usize> {
        self.injected_failure("count_visible")?;
        Ok(self.lock().visible(selector).len())
    }

    async fn texts(&self, selector: &Selector) -> ShopResult<Vec<String>> {
        self.injected_failure("texts")?;
        Ok(self
            .lock()
            .visible(selector)
            .into_iter()
            .map(|e| e.text.clone())
            .collect())
    }

    async fn value(&self, selector: &Selector, index: usize) -> ShopResult<String> {
        let state = self.lock();
        state.require(selector, index)?;
        Ok(state
            .values
            .get(&(selector.clone(), index))
            .cloned()
            .unwrap_or_default())
    }

    async fn click(&self, selector: &Selector, index: usize) -> ShopResult<()> {
        self.injected_failure("click")?;
        let reaction = {
            let mut state = self.lock();
            state.require(selector, index)?;
            state.history.push(format!("click:{selector}"));
            self.reactions
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .get(selector)
                .cloned()
        };
        if let Some(reaction) = reaction {
            reaction(&mut self.lock());
        }
        Ok(())
    }

    async fn fill(&self, selector: &Selector, index: usize, value: &str) -> ShopResult<()> {
        let mut state = self.lock();
        state.require(selector, index)?;
        state.history.push(format!("fill:{selector}={value}"));
        let _ = state
            .values
            .insert((selector.clone(), index), value.to_string());
        Ok(())
    }

    async fn select_option(
        &self,
        selector: &Selector,
        index: usize,
        value: &str,
    ) -> ShopResult<()> {
        let mut state = self.lock();
        state.require(selector, index)?;
        state.history.push(format!("select:{selector}={value}"));
        let _ = state
            .values
            .insert((selector.clone(), index), value.to_string());
        Ok(())
    }

    async fn set_checked(
        &self,
        selector: &Selector,
        index: usize,
        checked: bool,
    ) -> ShopResult<()> {
        let mut state = self.lock();
        state.require(selector, index)?;
        state.history.push(format!("check:{selector}={checked}"));
        let key = (selector.clone(), index);
        if checked {
            let _ = state.checked.insert(key);
        } else {
            let _ = state.checked.remove(&key);
        }
        Ok(())
    }

    async fn set_input_files(
        &self,
        selector: &Selector,
        index: usize,
        path: &Path,
    ) -> ShopResult<()> {
        let mut state = self.lock();
        state.require(selector, index)?;
        state
            .history
            .push(format!("upload:{selector}={}", path.display()));
        let _ = state.files.insert(selector.clone(), path.to_path_buf());
        Ok(())
    }

    async fn accept_dialogs(&self) -> ShopResult<()> {
        let mut state = self.lock();
        state.history.push("accept_dialogs".to_string());
        state.dialogs_accepted = true;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> ShopResult<serde_json::Value> {
        self.lock().history.push(format!("evaluate:{script}"));
        Ok(serde_json::Value::Null)
    }

    async fn screenshot(&self) -> ShopResult<Screenshot> {
        Ok(Screenshot::new(vec![0x89, 0x50, 0x4E, 0x47]))
    }

    async fn close(&self) -> ShopResult<()> {
        self.lock().history.push("close".to_string());
        Ok(())
    }
}

/// `https://host:port` part of a URL, empty for `about:` URLs
#[must_use]
pub fn url_origin(url: &str) -> &str {
    match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            let host_end = rest.find('/').map_or(url.len(), |i| scheme_end + 3 + i);
            &url[..host_end]
        }
        None => "",
    }
}

/// Path part of a URL without query or fragment; `/` for a bare origin
#[must_use]
pub fn url_path(url: &str) -> String {
    let after_origin = &url[url_origin(url).len()..];
    let end = after_origin
        .find(|c| c == '?' || c == '#')
        .unwrap_or(after_origin.len());
    let path = &after_origin[..end];
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod url_tests {
        use super::*;

        #[test]
        fn test_origin_and_path() {
            let url = "https://automationexercise.com/product_details/3?x=1#top";
            assert_eq!(url_origin(url), "https://automationexercise.com");
            assert_eq!(url_path(url), "/product_details/3");
        }

        #[test]
        fn test_bare_origin_is_root() {
            assert_eq!(url_path("https://automationexercise.com"), "/");
            assert_eq!(url_path("http://127.0.0.1:8080/"), "/");
        }

        #[test]
        fn test_about_blank() {
            assert_eq!(url_origin("about:blank"), "");
            assert_eq!(url_path("about:blank"), "about:blank");
        }
    }

    mod screenshot_tests {
        use super::*;

        #[test]
        fn test_screenshot_is_valid() {
            assert!(Screenshot::new(vec![1, 2, 3]).is_valid());
            assert!(!Screenshot::new(vec![]).is_valid());
        }

        #[test]
        fn test_screenshot_save() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("shot.png");
            Screenshot::new(vec![0x89, 0x50]).save(&path).unwrap();
            assert_eq!(std::fs::read(&path).unwrap(), vec![0x89, 0x50]);
        }
    }

    mod mock_driver_tests {
        use super::*;

        fn button() -> Selector {
            Selector::css("button#go")
        }

        #[tokio::test]
        async fn test_elements_are_per_path() {
            let driver = MockDriver::new();
            driver.add_element("/login", button(), "Go");
            driver.navigate("https://shop.test/").await.unwrap();
            assert_eq!(driver.count_visible(&button()).await.unwrap(), 0);

            driver.navigate("https://shop.test/login").await.unwrap();
            assert_eq!(driver.count_visible(&button()).await.unwrap(), 1);
            assert_eq!(driver.texts(&button()).await.unwrap(), vec!["Go"]);
        }

        #[tokio::test]
        async fn test_click_runs_reaction() {
            let driver = MockDriver::new();
            driver.add_element("/", button(), "Go");
            driver.on_click(button(), |state| state.go("/done"));
            driver.navigate("https://shop.test/").await.unwrap();

            driver.click(&button(), 0).await.unwrap();
            assert_eq!(
                driver.current_url().await.unwrap(),
                "https://shop.test/done"
            );
            assert!(driver.was_called("click:css=button#go"));
        }

        #[tokio::test]
        async fn test_click_missing_element_fails() {
            let driver = MockDriver::new();
            driver.navigate("https://shop.test/").await.unwrap();
            assert!(driver.click(&button(), 0).await.is_err());
        }

        #[tokio::test]
        async fn test_fill_and_value() {
            let driver = MockDriver::new();
            let input = Selector::data_qa("login-email");
            driver.add_element("/login", input.clone(), "");
            driver.navigate("https://shop.test/login").await.unwrap();

            driver.fill(&input, 0, "a@b.test").await.unwrap();
            assert_eq!(driver.value(&input, 0).await.unwrap(), "a@b.test");
            driver.with_state(|s| assert_eq!(s.value_of(&input), Some("a@b.test")));
        }

        #[tokio::test]
        async fn test_hidden_elements_are_not_counted() {
            let driver = MockDriver::new();
            driver.with_state(|s| s.show("/", MockElement::hidden(button())));
            driver.navigate("https://shop.test/").await.unwrap();
            assert_eq!(driver.count_visible(&button()).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_every_page_elements() {
            let driver = MockDriver::new();
            let logout = Selector::css("a[href=\"/logout\"]");
            driver.add_element(EVERY_PAGE, logout.clone(), "Logout");
            driver.navigate("https://shop.test/products").await.unwrap();
            assert_eq!(driver.count_visible(&logout).await.unwrap(), 1);
            driver.navigate("https://shop.test/view_cart").await.unwrap();
            assert_eq!(driver.count_visible(&logout).await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_fail_next_fires_once() {
            let driver = MockDriver::new();
            driver.fail_next(
                "count_visible",
                ShopError::ScriptError {
                    message: "Execution context was destroyed.".to_string(),
                },
            );
            assert!(driver.count_visible(&button()).await.is_err());
            assert_eq!(driver.count_visible(&button()).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_navigation_resets_dialog_handling() {
            let driver = MockDriver::new();
            driver.navigate("https://shop.test/contact_us").await.unwrap();
            driver.accept_dialogs().await.unwrap();
            assert!(driver.with_state(|s| s.dialogs_accepted()));
            driver.navigate("https://shop.test/").await.unwrap();
            assert!(!driver.with_state(|s| s.dialogs_accepted()));
        }
    }
}

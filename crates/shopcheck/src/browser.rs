//! Browser control over the Chrome `DevTools` Protocol.
//!
//! With the `browser` feature, [`Browser`] launches Chromium through
//! chromiumoxide and hands out one [`ChromiumDriver`] per scenario. Element
//! queries run as JavaScript built from [`Selector::to_elements_expr`], so
//! every selector kind (role, label, text, CSS) resolves the same way.
//! Without the feature, [`Browser::launch`] reports that no browser is
//! available and the suite can only run against a [`crate::MockDriver`].

#![cfg_attr(not(feature = "browser"), allow(dead_code))]

use crate::locator::{js_str, Selector};
use crate::result::{ShopError, ShopResult};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Open `DevTools` for every tab
    pub devtools: bool,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            devtools: false,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Open `DevTools` alongside each page
    #[must_use]
    pub const fn with_devtools(mut self, devtools: bool) -> Self {
        self.devtools = devtools;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

const VISIBLE_FN: &str = "(el => !!(el.offsetWidth || el.offsetHeight || \
    el.getClientRects().length) && getComputedStyle(el).visibility !== 'hidden')";

/// Visible matches of `selector`, as a JavaScript array expression
fn visible_expr(selector: &Selector) -> String {
    format!("({}).filter({VISIBLE_FN})", selector.to_elements_expr())
}

/// Script running `body` against the `index`-th visible match, bound to
/// `el`. Evaluates to `false` when that element does not exist.
fn element_script(selector: &Selector, index: usize, body: &str) -> String {
    format!(
        "(() => {{ const el = {}[{index}]; if (!el) return false; \
         el.scrollIntoView({{block: 'center'}}); {body}; return true; }})()",
        visible_expr(selector)
    )
}

fn click_script(selector: &Selector, index: usize) -> String {
    element_script(selector, index, "el.click()")
}

fn fill_script(selector: &Selector, index: usize, value: &str) -> String {
    let value = js_str(value);
    element_script(
        selector,
        index,
        &format!(
            "el.focus(); el.value = {value}; \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             el.dispatchEvent(new Event('change', {{bubbles: true}}))"
        ),
    )
}

fn select_script(selector: &Selector, index: usize, value: &str) -> String {
    let value = js_str(value);
    element_script(
        selector,
        index,
        &format!(
            "const opt = Array.from(el.options).find(o => o.value === {value} || \
             o.textContent.trim() === {value}); \
             if (!opt) throw new Error('no option ' + {value}); \
             el.value = opt.value; \
             el.dispatchEvent(new Event('change', {{bubbles: true}}))"
        ),
    )
}

fn check_script(selector: &Selector, index: usize, checked: bool) -> String {
    element_script(
        selector,
        index,
        &format!("if (el.checked !== {checked}) el.click()"),
    )
}

/// Accept `confirm()` and swallow `alert()` for the current document
const ACCEPT_DIALOGS_SCRIPT: &str =
    "window.confirm = () => true; window.alert = () => {}; window.prompt = () => ''; true";

fn not_found(selector: &Selector, index: usize) -> ShopError {
    ShopError::ElementNotFound {
        selector: format!("{selector} >> nth={index}"),
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening, clippy::missing_errors_doc)]
mod cdp {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use tokio::sync::Mutex;
    use tracing::{debug, warn};

    use crate::driver::{Driver, DriverFactory, Screenshot};

    fn page_err(e: impl std::fmt::Display) -> ShopError {
        ShopError::PageError {
            message: e.to_string(),
        }
    }

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a new browser instance with real CDP
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> ShopResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if config.devtools {
                builder = builder.arg("--auto-open-devtools-for-tabs");
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ShopError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                ShopError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if let Err(e) = h {
                        warn!(error = %e, "CDP handler stopped");
                        break;
                    }
                }
            });

            debug!(headless = config.headless, "browser launched");
            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Open a new page sized to the configured viewport
        ///
        /// # Errors
        ///
        /// Returns error if page cannot be created
        pub async fn new_page(&self) -> ShopResult<ChromiumDriver> {
            let browser = self.inner.lock().await;
            let page = browser.new_page("about:blank").await.map_err(page_err)?;
            let metrics = SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(self.config.viewport_width))
                .height(i64::from(self.config.viewport_height))
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(page_err)?;
            let _ = page.execute(metrics).await.map_err(page_err)?;
            Ok(ChromiumDriver { page })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> ShopResult<()> {
            let mut browser = self.inner.lock().await;
            let _ = browser
                .close()
                .await
                .map_err(|e| ShopError::BrowserLaunchError {
                    message: e.to_string(),
                })?;
            self.handle.abort();
            Ok(())
        }
    }

    #[async_trait]
    impl DriverFactory for Browser {
        async fn new_driver(&self) -> ShopResult<Arc<dyn Driver>> {
            Ok(Arc::new(self.new_page().await?))
        }
    }

    /// One Chromium tab behind the [`Driver`] seam
    #[derive(Debug)]
    pub struct ChromiumDriver {
        page: CdpPage,
    }

    impl ChromiumDriver {
        async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> ShopResult<T> {
            self.page
                .evaluate(script)
                .await
                .map_err(|e| ShopError::ScriptError {
                    message: e.to_string(),
                })?
                .into_value()
                .map_err(|e| ShopError::ScriptError {
                    message: e.to_string(),
                })
        }

        async fn act(&self, script: String, selector: &Selector, index: usize) -> ShopResult<()> {
            if self.eval::<bool>(&script).await? {
                Ok(())
            } else {
                Err(not_found(selector, index))
            }
        }
    }

    #[async_trait]
    impl Driver for ChromiumDriver {
        async fn navigate(&self, url: &str) -> ShopResult<()> {
            let _ = self
                .page
                .goto(url)
                .await
                .map_err(|e| ShopError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> ShopResult<String> {
            Ok(self
                .page
                .url()
                .await
                .map_err(page_err)?
                .unwrap_or_else(|| "about:blank".to_string()))
        }

        async fn count_visible(&self, selector: &Selector) -> ShopResult<usize> {
            self.eval(&format!("{}.length", visible_expr(selector))).await
        }

        async fn texts(&self, selector: &Selector) -> ShopResult<Vec<String>> {
            self.eval(&format!(
                "{}.map(el => el.textContent || '')",
                visible_expr(selector)
            ))
            .await
        }

        async fn value(&self, selector: &Selector, index: usize) -> ShopResult<String> {
            let value: Option<String> = self
                .eval(&format!(
                    "(() => {{ const el = {}[{index}]; return el ? String(el.value ?? '') : null; }})()",
                    visible_expr(selector)
                ))
                .await?;
            value.ok_or_else(|| not_found(selector, index))
        }

        async fn click(&self, selector: &Selector, index: usize) -> ShopResult<()> {
            self.act(click_script(selector, index), selector, index).await
        }

        async fn fill(&self, selector: &Selector, index: usize, value: &str) -> ShopResult<()> {
            self.act(fill_script(selector, index, value), selector, index)
                .await
        }

        async fn select_option(
            &self,
            selector: &Selector,
            index: usize,
            value: &str,
        ) -> ShopResult<()> {
            self.act(select_script(selector, index, value), selector, index)
                .await
        }

        async fn set_checked(
            &self,
            selector: &Selector,
            index: usize,
            checked: bool,
        ) -> ShopResult<()> {
            self.act(check_script(selector, index, checked), selector, index)
                .await
        }

        async fn set_input_files(
            &self,
            selector: &Selector,
            index: usize,
            path: &Path,
        ) -> ShopResult<()> {
            let params = EvaluateParams::builder()
                .expression(format!("{}[{index}]", visible_expr(selector)))
                .return_by_value(false)
                .build()
                .map_err(|message| ShopError::InputError { message })?;
            let object_id = self
                .page
                .execute(params)
                .await
                .map_err(|e| ShopError::InputError {
                    message: e.to_string(),
                })?
                .result
                .result
                .object_id
                .ok_or_else(|| not_found(selector, index))?;
            let upload = SetFileInputFilesParams::builder()
                .file(path.display().to_string())
                .object_id(object_id)
                .build()
                .map_err(|message| ShopError::InputError { message })?;
            let _ = self
                .page
                .execute(upload)
                .await
                .map_err(|e| ShopError::InputError {
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn accept_dialogs(&self) -> ShopResult<()> {
            let _: bool = self.eval(ACCEPT_DIALOGS_SCRIPT).await?;
            Ok(())
        }

        async fn evaluate(&self, script: &str) -> ShopResult<serde_json::Value> {
            self.eval(script).await
        }

        async fn screenshot(&self) -> ShopResult<Screenshot> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();

            let shot = self
                .page
                .execute(params)
                .await
                .map_err(|e| ShopError::ScreenshotError {
                    message: e.to_string(),
                })?;

            use base64::Engine;
            let data = base64::engine::general_purpose::STANDARD
                .decode(&shot.data)
                .map_err(|e| ShopError::ScreenshotError {
                    message: e.to_string(),
                })?;
            Ok(Screenshot::new(data))
        }

        async fn close(&self) -> ShopResult<()> {
            self.page.clone().close().await.map_err(page_err)
        }
    }
}

// ============================================================================
// Stand-in when the `browser` feature is NOT enabled
// ============================================================================

#[cfg(not(feature = "browser"))]
mod unavailable {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::{BrowserConfig, ShopError, ShopResult};
    use crate::driver::{Driver, DriverFactory};

    /// Placeholder that never launches
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
    }

    impl Browser {
        /// Always fails: the crate was built without the `browser` feature
        ///
        /// # Errors
        ///
        /// Always returns `BrowserLaunchError`
        pub async fn launch(config: BrowserConfig) -> ShopResult<Self> {
            tracing::debug!(headless = config.headless, "browser feature disabled");
            Err(ShopError::BrowserLaunchError {
                message: "built without the `browser` feature; rebuild with --features browser"
                    .to_string(),
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Nothing to close
        ///
        /// # Errors
        ///
        /// Never fails
        pub async fn close(self) -> ShopResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl DriverFactory for Browser {
        async fn new_driver(&self) -> ShopResult<Arc<dyn Driver>> {
            Err(ShopError::BrowserNotFound)
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Browser, ChromiumDriver};

#[cfg(not(feature = "browser"))]
pub use unavailable::Browser;

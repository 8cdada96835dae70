//! Page Object Model support.
//!
//! Every storefront page in [`crate::pages`] implements [`PageObject`]: it
//! owns its locators, holds a [`Page`] handle for one scenario and exposes
//! intention-revealing actions. The trait supplies the shared "open this
//! page and wait until it is really there" behaviour.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::locator::Locator;
use crate::page::Page;
use crate::result::ShopResult;

/// A page or section of the storefront.
///
/// # Example
///
/// ```ignore
/// struct LoginPage {
///     page: Page,
///     email: Locator,
///     heading: Locator,
/// }
///
/// impl PageObject for LoginPage {
///     fn page(&self) -> &Page {
///         &self.page
///     }
///
///     fn path(&self) -> &str {
///         "/login"
///     }
///
///     fn ready_marker(&self) -> Option<&Locator> {
///         Some(&self.heading)
///     }
/// }
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// The page handle this object drives
    fn page(&self) -> &Page;

    /// Path [`PageObject::open`] navigates to
    fn path(&self) -> &str;

    /// Pattern the current path must match once loaded (see [`UrlMatcher`])
    fn url_pattern(&self) -> &str {
        self.path()
    }

    /// Element whose visibility proves the page rendered
    fn ready_marker(&self) -> Option<&Locator> {
        None
    }

    /// Short name for logs and traces
    fn page_name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Navigate to [`PageObject::path`] and wait until loaded
    ///
    /// # Errors
    ///
    /// Returns error if navigation fails or the page never becomes ready
    async fn open(&self) -> ShopResult<()> {
        debug!(page = self.page_name(), "open");
        self.page().goto(self.path()).await?;
        self.wait_until_loaded().await
    }

    /// Wait until the URL matches and the ready marker is visible
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if either condition is not observed in time
    async fn wait_until_loaded(&self) -> ShopResult<()> {
        self.page().expect_path(self.url_pattern()).await?;
        if let Some(marker) = self.ready_marker() {
            self.page().expect(marker).to_be_visible().await?;
        }
        Ok(())
    }

    /// Whether the browser is on this page right now; does not wait
    ///
    /// # Errors
    ///
    /// Returns error if the driver cannot report the URL
    async fn is_current(&self) -> ShopResult<bool> {
        let path = self.page().current_path().await?;
        Ok(UrlMatcher::new(self.url_pattern()).matches(&path))
    }
}

/// URL path pattern matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Rest,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/login`
    /// - Wildcards: `/category_products/*`
    /// - Named parameters: `/product_details/:id`
    /// - A trailing `**` matching any remainder, including nothing
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "*" => UrlSegment::Wildcard,
                "**" => UrlSegment::Rest,
                _ => s.strip_prefix(':').map_or_else(
                    || UrlSegment::Literal(s.to_string()),
                    |name| UrlSegment::Parameter(name.to_string()),
                ),
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a path matches the pattern
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }

    /// Named parameters of a matching path, `None` if it does not match
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = HashMap::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                UrlSegment::Rest => return Some(params),
                UrlSegment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                UrlSegment::Wildcard => {
                    parts.get(i)?;
                }
                UrlSegment::Parameter(name) => {
                    let value = parts.get(i)?;
                    let _ = params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

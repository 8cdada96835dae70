//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a value: a [`Selector`] plus the options that govern how
//! strictly and how long it is resolved. Page objects keep their locators as
//! fields and hand them to [`crate::Page`] to act on or assert against.
//!
//! # Design
//!
//! - **Auto-waiting**: actions poll until the element is actionable or the
//!   timeout elapses
//! - **Strict selection**: an action fails if more than one element matches,
//!   unless the locator pins an index with [`Locator::nth`]
//! - **Role/label first**: most storefront locators are keyed by ARIA role,
//!   label or the site's `data-qa` attributes rather than layout CSS

use std::fmt;
use std::time::Duration;

use crate::result::{ShopError, ShopResult};

/// Default timeout for auto-waiting (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for auto-waiting (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// ARIA roles understood by [`Selector::Role`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// `button`, `input[type=submit]`, `[role=button]`
    Button,
    /// `a[href]`, `[role=link]`
    Link,
    /// `h1`..`h6`, `[role=heading]`
    Heading,
    /// Text-like inputs and textareas
    Textbox,
    /// `input[type=checkbox]`
    Checkbox,
    /// `input[type=radio]`
    Radio,
    /// `select`
    Combobox,
}

impl Role {
    /// CSS that enumerates candidate elements for this role
    #[must_use]
    pub const fn candidates_css(self) -> &'static str {
        match self {
            Self::Button => {
                "button, input[type=submit], input[type=button], input[type=reset], [role=button]"
            }
            Self::Link => "a[href], [role=link]",
            Self::Heading => "h1, h2, h3, h4, h5, h6, [role=heading]",
            Self::Textbox => {
                "input:not([type]), input[type=text], input[type=email], input[type=password], \
                 input[type=tel], input[type=number], input[type=search], textarea, [role=textbox]"
            }
            Self::Checkbox => "input[type=checkbox], [role=checkbox]",
            Self::Radio => "input[type=radio], [role=radio]",
            Self::Combobox => "select, [role=combobox]",
        }
    }

    /// Role name as written in ARIA
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Link => "link",
            Self::Heading => "heading",
            Self::Textbox => "textbox",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Combobox => "combobox",
        }
    }
}

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., "button.check_out")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Deepest elements whose text contains the string
    Text(String),
    /// CSS selector filtered by text content
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// ARIA role with an accessible-name filter (case-insensitive substring)
    Role {
        /// Role to match
        role: Role,
        /// Accessible name; empty matches every element of the role
        name: String,
    },
    /// Form control associated with a `<label>` or `aria-label`
    Label(String),
    /// Input with a matching placeholder
    Placeholder(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a selector for the storefront's `data-qa` test attribute
    #[must_use]
    pub fn data_qa(value: &str) -> Self {
        Self::Css(format!("[data-qa=\"{value}\"]"))
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: Role, name: impl Into<String>) -> Self {
        Self::Role {
            role,
            name: name.into(),
        }
    }

    /// Create a label selector
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label(text.into())
    }

    /// Create a placeholder selector
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder(text.into())
    }

    /// JavaScript expression evaluating to an `Array` of matching elements
    #[must_use]
    pub fn to_elements_expr(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({}))", js_str(s)),
            Self::XPath(s) => format!(
                "(() => {{ const r = document.evaluate({}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
                 for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
                 return out; }})()",
                js_str(s)
            ),
            Self::Text(t) => format!(
                "Array.from(document.querySelectorAll('body *')).filter(el => \
                 el.textContent.includes({t}) && \
                 !Array.from(el.children).some(c => c.textContent.includes({t})))",
                t = js_str(t)
            ),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({})).filter(el => \
                 el.textContent.includes({}))",
                js_str(css),
                js_str(text)
            ),
            Self::Role { role, name } => format!(
                "Array.from(document.querySelectorAll({css})).filter(el => {{ \
                 const n = (el.getAttribute('aria-label') || \
                 (el.tagName === 'INPUT' ? (el.value || el.placeholder || '') : el.textContent) || '')\
                 .trim().toLowerCase(); return n.includes({name}.toLowerCase()); }})",
                css = js_str(role.candidates_css()),
                name = js_str(name),
            ),
            Self::Label(t) => format!(
                "[...Array.from(document.querySelectorAll('label')).filter(l => \
                 l.textContent.includes({t})).map(l => l.control).filter(Boolean), \
                 ...Array.from(document.querySelectorAll('[aria-label]')).filter(el => \
                 el.getAttribute('aria-label').includes({t}))]",
                t = js_str(t)
            ),
            Self::Placeholder(t) => format!(
                "Array.from(document.querySelectorAll('[placeholder]')).filter(el => \
                 el.getAttribute('placeholder').includes({}))",
                js_str(t)
            ),
        }
    }
}

/// `s` as a JavaScript string literal
pub(crate) fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| String::from("\"\""))
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(t) => write!(f, "text={t:?}"),
            Self::CssWithText { css, text } => write!(f, "css={css} >> text={text:?}"),
            Self::Role { role, name } => write!(f, "role={}[name={name:?}]", role.as_str()),
            Self::Label(t) => write!(f, "label={t:?}"),
            Self::Placeholder(t) => write!(f, "placeholder={t:?}"),
        }
    }
}

/// Locator options for customizing behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Timeout for auto-waiting
    pub timeout: Duration,
    /// Polling interval for auto-waiting
    pub poll_interval: Duration,
    /// Whether to require strict single-element match
    pub strict: bool,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            strict: true,
        }
    }
}

/// A locator for finding elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    index: Option<usize>,
    options: LocatorOptions,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            index: None,
            options: LocatorOptions::default(),
        }
    }

    /// Locate by ARIA role and accessible name
    #[must_use]
    pub fn role(role: Role, name: impl Into<String>) -> Self {
        Self::from_selector(Selector::role(role, name))
    }

    /// Locate a form control by its label
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::label(text))
    }

    /// Locate by the storefront's `data-qa` attribute
    #[must_use]
    pub fn data_qa(value: &str) -> Self {
        Self::from_selector(Selector::data_qa(value))
    }

    /// Locate by visible text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::text(text))
    }

    /// Filter by text content
    ///
    /// Only CSS locators can be narrowed; other selectors are returned as-is.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let selector = match self.selector {
            Selector::Css(css) => Selector::CssWithText {
                css,
                text: text.into(),
            },
            other => other,
        };
        Self { selector, ..self }
    }

    /// Pin the locator to the n-th match (zero based), disabling strictness
    #[must_use]
    pub fn nth(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Pin the locator to the first match
    #[must_use]
    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Enable or disable strict mode
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Pinned index, if any
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Pick the element this locator acts on among `count` visible matches.
    ///
    /// # Errors
    ///
    /// Returns `StrictModeViolation` when strict and several elements match.
    /// Returns `Ok(None)` when nothing (or not enough) matched yet.
    pub fn pick(&self, count: usize) -> ShopResult<Option<usize>> {
        match self.index {
            Some(i) if i < count => Ok(Some(i)),
            Some(_) => Ok(None),
            None if count == 0 => Ok(None),
            None if count > 1 && self.options.strict => Err(ShopError::StrictModeViolation {
                selector: self.to_string(),
                count,
            }),
            None => Ok(Some(0)),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{} >> nth={i}", self.selector),
            None => write!(f, "{}", self.selector),
        }
    }
}

/// Assertion types for `expect()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectAssertion {
    /// Element has exact (trimmed) text
    HasText {
        /// Expected text
        expected: String,
    },
    /// Element contains text
    ContainsText {
        /// Text to find
        expected: String,
    },
    /// Element is visible
    IsVisible,
    /// Element is hidden or absent
    IsHidden,
    /// Visible element count matches
    HasCount {
        /// Expected count
        expected: usize,
    },
    /// Form control value matches
    HasValue {
        /// Expected value
        expected: String,
    },
}

impl ExpectAssertion {
    /// Validate a text assertion against the observed text
    ///
    /// # Errors
    ///
    /// Returns error if assertion fails
    pub fn validate(&self, actual: &str) -> ShopResult<()> {
        match self {
            Self::HasText { expected } | Self::HasValue { expected } => {
                if actual.trim() == expected.trim() {
                    Ok(())
                } else {
                    Err(ShopError::assertion(format!(
                        "Expected text '{expected}' but got '{}'",
                        actual.trim()
                    )))
                }
            }
            Self::ContainsText { expected } => {
                if actual.contains(expected.as_str()) {
                    Ok(())
                } else {
                    Err(ShopError::assertion(format!(
                        "Expected text to contain '{expected}' but got '{}'",
                        actual.trim()
                    )))
                }
            }
            Self::IsVisible | Self::IsHidden | Self::HasCount { .. } => Ok(()),
        }
    }

    /// Validate a count assertion
    ///
    /// # Errors
    ///
    /// Returns error if count doesn't match
    pub fn validate_count(&self, actual: usize) -> ShopResult<()> {
        let ok = match self {
            Self::HasCount { expected } => actual == *expected,
            Self::IsVisible => actual > 0,
            Self::IsHidden => actual == 0,
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(ShopError::assertion(match self {
                Self::HasCount { expected } => {
                    format!("Expected count {expected} but got {actual}")
                }
                Self::IsVisible => "Expected element to be visible".to_string(),
                _ => format!("Expected element to be hidden but {actual} visible"),
            }))
        }
    }

    /// Short description used in timeout messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::HasText { expected } => format!("to have text {expected:?}"),
            Self::ContainsText { expected } => format!("to contain text {expected:?}"),
            Self::IsVisible => "to be visible".to_string(),
            Self::IsHidden => "to be hidden".to_string(),
            Self::HasCount { expected } => format!("to have count {expected}"),
            Self::HasValue { expected } => format!("to have value {expected:?}"),
        }
    }
}

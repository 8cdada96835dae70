//! Shopcheck: Page-Object End-to-End Suite for the Automation Exercise Storefront
//!
//! Scenarios drive automationexercise.com through page objects and cross-check
//! the results against the storefront's JSON API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SHOPCHECK Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenarios  │    │ Page       │    │ Driver     │            │
//! │   │ (flows)    │───►│ Objects    │───►│ CDP / Mock │            │
//! │   └─────┬──────┘    └────────────┘    └────────────┘            │
//! │         │           ┌────────────┐                               │
//! │         └──────────►│ API client │──► /api/* (reqwest)           │
//! │                     └────────────┘                               │
//! │   SuiteRunner ─► Reporter ─► report.html / junit.xml / traces    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use shopcheck::{flows, Browser, ScenarioFilter, Silent, SuiteConfig, SuiteRunner};
//!
//! let config = SuiteConfig::load(None)?;
//! let browser = Browser::launch(config.browser_config()).await?;
//! let scenarios = ScenarioFilter::new(Some("cart"), None)?.select(&flows::all());
//! let reporter = SuiteRunner::new(config)?
//!     .run(&scenarios, &browser, &mut Silent)
//!     .await;
//! println!("{}", reporter.summary());
//! ```

#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Storefront JSON API client
pub mod api;

#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod browser;

/// Suite configuration: YAML file, environment, CLI overrides
pub mod config;

/// Test data: customer profiles, cards, contact messages, the catalog
pub mod data;

#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod driver;

/// Scenario registry and the flows behind it
#[allow(clippy::missing_errors_doc)]
pub mod flows;

#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod locator;

#[allow(clippy::missing_errors_doc)]
mod page;

mod page_object;

/// Page objects, one per storefront page
#[allow(clippy::missing_errors_doc)]
pub mod pages;

#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::format_push_string
)]
mod reporter;
mod result;

#[allow(clippy::missing_errors_doc)]
mod scenario;

/// Sequential suite runner with retries, timeouts and failure artifacts
#[allow(clippy::missing_errors_doc)]
pub mod suite;

/// Auto-wait polling
pub mod wait;

#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use browser::{Browser, BrowserConfig};
pub use config::{SuiteConfig, Viewport};
pub use driver::{
    url_path, Driver, DriverFactory, FnFactory, MockDriver, MockElement, MockState, Screenshot,
    EVERY_PAGE,
};
pub use locator::{Locator, LocatorOptions, Role, Selector};
pub use page::{Expect, Page, PageSettings};
pub use page_object::{PageObject, UrlMatcher};
pub use reporter::{
    FailureMode, Reporter, RunReport, ScenarioResult, StepRecord, TestStatus, TraceData,
    HTML_REPORT, JSON_REPORT, JUNIT_REPORT,
};
pub use result::{ShopError, ShopResult};
pub use scenario::{Scenario, ScenarioContext, ScenarioFn, ScenarioFuture};
pub use suite::{RunObserver, ScenarioFilter, Silent, SuiteRunner};

/// Prelude for writing additional scenarios
pub mod prelude {
    pub use super::data::{UserProfile, CATALOG};
    pub use super::{
        PageObject, Scenario, ScenarioContext, ShopError, ShopResult, SuiteConfig, SuiteRunner,
    };
}

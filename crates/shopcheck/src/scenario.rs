//! Scenarios and the context they run in.
//!
//! A [`Scenario`] is a named async function over a [`ScenarioContext`].
//! The context owns the scenario's fresh [`Page`], an [`ApiClient`] and the
//! step trace; page objects are built from it on demand. Steps are plain
//! futures wrapped by [`ScenarioContext::step`], which times them and
//! records the outcome.

use std::fmt;
use std::future::Future;
use std::sync::Mutex;
use std::time::Instant;

use futures::future::BoxFuture;
use tracing::{debug, info, info_span, Instrument};

use crate::api::ApiClient;
use crate::page::Page;
use crate::pages::{
    AccountStatusPage, CartPage, CheckoutPage, ContactPage, Header, HomePage, LoginPage,
    PaymentPage, ProductDetailPage, ProductsPage, SignupPage,
};
use crate::reporter::TraceData;
use crate::result::ShopResult;

/// Future returned by a scenario body
pub type ScenarioFuture<'a> = BoxFuture<'a, ShopResult<()>>;

/// Scenario body
pub type ScenarioFn = for<'a> fn(&'a ScenarioContext) -> ScenarioFuture<'a>;

/// A named user journey, grouped into a suite
#[derive(Clone, Copy)]
pub struct Scenario {
    pub suite: &'static str,
    pub name: &'static str,
    run: ScenarioFn,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("suite", &self.suite)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    #[must_use]
    pub const fn new(suite: &'static str, name: &'static str, run: ScenarioFn) -> Self {
        Self { suite, name, run }
    }

    /// `suite / name`, the string `--grep` matches against
    #[must_use]
    pub fn id(&self) -> String {
        format!("{} / {}", self.suite, self.name)
    }

    /// File-name-safe form of [`Self::id`], e.g. `account-register-user`
    #[must_use]
    pub fn slug(&self) -> String {
        let mut slug = String::new();
        for c in self.id().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        slug.trim_end_matches('-').to_string()
    }

    /// Run the body against a context
    pub fn run<'a>(&self, ctx: &'a ScenarioContext) -> ScenarioFuture<'a> {
        (self.run)(ctx)
    }
}

/// Everything a scenario body can reach
#[derive(Debug)]
pub struct ScenarioContext {
    page: Page,
    api: ApiClient,
    trace: Mutex<TraceData>,
    log_steps: bool,
}

impl ScenarioContext {
    #[must_use]
    pub fn new(page: Page, api: ApiClient, trace: TraceData) -> Self {
        Self {
            page,
            api,
            trace: Mutex::new(trace),
            log_steps: false,
        }
    }

    /// Log every step at `info` instead of `debug`
    #[must_use]
    pub const fn with_step_logging(mut self, on: bool) -> Self {
        self.log_steps = on;
        self
    }

    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Run one named step, recording its duration and outcome
    pub async fn step<T, F>(&self, name: &str, action: F) -> ShopResult<T>
    where
        F: Future<Output = ShopResult<T>>,
    {
        if self.log_steps {
            info!(step = name, "step");
        } else {
            debug!(step = name, "step");
        }
        let started = Instant::now();
        let outcome = action.instrument(info_span!("step", step = name)).await;
        let error = outcome.as_ref().err().map(ToString::to_string);
        if let Some(error) = &error {
            debug!(step = name, %error, "step failed");
        }
        self.trace
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .add_step(name, started.elapsed(), error);
        outcome
    }

    /// Steps recorded so far
    #[must_use]
    pub fn trace(&self) -> TraceData {
        self.trace
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn header(&self) -> Header {
        Header::new(&self.page)
    }

    #[must_use]
    pub fn home(&self) -> HomePage {
        HomePage::new(&self.page)
    }

    #[must_use]
    pub fn login(&self) -> LoginPage {
        LoginPage::new(&self.page)
    }

    #[must_use]
    pub fn signup(&self) -> SignupPage {
        SignupPage::new(&self.page)
    }

    #[must_use]
    pub fn account_status(&self) -> AccountStatusPage {
        AccountStatusPage::new(&self.page)
    }

    #[must_use]
    pub fn products(&self) -> ProductsPage {
        ProductsPage::new(&self.page)
    }

    #[must_use]
    pub fn product_detail(&self, product_id: u32) -> ProductDetailPage {
        ProductDetailPage::new(&self.page, product_id)
    }

    #[must_use]
    pub fn cart(&self) -> CartPage {
        CartPage::new(&self.page)
    }

    #[must_use]
    pub fn checkout(&self) -> CheckoutPage {
        CheckoutPage::new(&self.page)
    }

    #[must_use]
    pub fn payment(&self) -> PaymentPage {
        PaymentPage::new(&self.page)
    }

    #[must_use]
    pub fn contact(&self) -> ContactPage {
        ContactPage::new(&self.page)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::page_object::PageObject;
    use crate::pages::testing::fast_page;
    use crate::result::ShopError;
    use futures::FutureExt;
    use std::sync::Arc;

    fn context() -> ScenarioContext {
        let driver = Arc::new(MockDriver::new());
        ScenarioContext::new(
            fast_page(&driver),
            ApiClient::new("http://127.0.0.1:9"),
            TraceData::new("demo / steps", 1),
        )
    }

    async fn two_steps(ctx: &ScenarioContext) -> ShopResult<()> {
        ctx.step("open home", ctx.page().goto("/")).await?;
        ctx.step("fail", async { Err::<(), _>(ShopError::assertion("nope")) })
            .await
    }

    mod scenario_tests {
        use super::*;

        #[test]
        fn test_id_and_slug() {
            let s = Scenario::new("cart", "Add products to cart!", |ctx| two_steps(ctx).boxed());
            assert_eq!(s.id(), "cart / Add products to cart!");
            assert_eq!(s.slug(), "cart-add-products-to-cart");
        }

        #[test]
        fn test_debug_names_scenario() {
            let s = Scenario::new("api", "products list", |ctx| two_steps(ctx).boxed());
            assert!(format!("{s:?}").contains("products list"));
        }

        #[tokio::test]
        async fn test_run_records_steps() {
            let ctx = context();
            let s = Scenario::new("demo", "steps", |ctx| two_steps(ctx).boxed());
            let err = s.run(&ctx).await.unwrap_err();
            assert!(matches!(err, ShopError::AssertionFailed { .. }));

            let trace = ctx.trace();
            assert_eq!(trace.steps.len(), 2);
            assert!(trace.steps[0].status.is_passed());
            assert_eq!(trace.failed_step().unwrap().name, "fail");
            assert!(trace.steps[1].error.as_deref().unwrap().contains("nope"));
        }
    }

    mod context_tests {
        use super::*;

        #[tokio::test]
        async fn test_step_passes_value_through() {
            let ctx = context().with_step_logging(true);
            let n = ctx.step("count", async { Ok(3) }).await.unwrap();
            assert_eq!(n, 3);
            assert_eq!(ctx.trace().steps.len(), 1);
        }

        #[test]
        fn test_page_objects_share_the_page() {
            let ctx = context();
            assert_eq!(ctx.home().page().base_url(), ctx.page().base_url());
            assert_eq!(ctx.product_detail(3).path(), "/product_details/3");
        }
    }
}

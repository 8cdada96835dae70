//! The suite's scenarios, grouped by storefront area.
//!
//! Each flow is a linear script of page-object calls, wrapped in named
//! steps. The one branch is [`account::ensure_account`], which logs in
//! instead of registering when the storefront already knows the email.

pub mod account;
pub mod api_checks;
pub mod browse;
pub mod contact;
pub mod shopping;

#[cfg(test)]
pub(crate) mod fake_shop;

use std::future::Future;

use futures::FutureExt;
use tracing::{info, warn};

use crate::result::{ShopError, ShopResult};
use crate::scenario::{Scenario, ScenarioContext};

/// Every scenario, grouped by suite, in run order
#[must_use]
pub fn all() -> Vec<Scenario> {
    vec![
        Scenario::new("account", "register user", |c| account::register_user(c).boxed()),
        Scenario::new("account", "register and delete restores state", |c| {
            account::register_and_delete_restores_state(c).boxed()
        }),
        Scenario::new("account", "login with valid credentials", |c| {
            account::login_with_valid_credentials(c).boxed()
        }),
        Scenario::new("account", "login with invalid credentials", |c| {
            account::login_with_invalid_credentials(c).boxed()
        }),
        Scenario::new("account", "register with existing email", |c| {
            account::register_with_existing_email(c).boxed()
        }),
        Scenario::new("account", "logout", |c| account::logout(c).boxed()),
        Scenario::new("products", "search product", |c| browse::search_product(c).boxed()),
        Scenario::new("products", "view product details", |c| {
            browse::view_product_details(c).boxed()
        }),
        Scenario::new("home", "subscribe from footer", |c| browse::subscribe(c).boxed()),
        Scenario::new("cart", "add products to cart", |c| {
            shopping::add_products_to_cart(c).boxed()
        }),
        Scenario::new("cart", "product quantity in cart", |c| {
            shopping::product_quantity_in_cart(c).boxed()
        }),
        Scenario::new("cart", "remove product", |c| shopping::remove_product(c).boxed()),
        Scenario::new("checkout", "place order", |c| shopping::place_order(c).boxed()),
        Scenario::new("checkout", "register while checking out", |c| {
            shopping::register_while_checking_out(c).boxed()
        }),
        Scenario::new("contact", "submit contact form", |c| {
            contact::submit_contact_form(c).boxed()
        }),
        Scenario::new("contact", "missing required fields", |c| {
            contact::missing_required_fields(c).boxed()
        }),
        Scenario::new("api", "products list", |c| api_checks::products_list(c).boxed()),
        Scenario::new("api", "brands list", |c| api_checks::brands_list(c).boxed()),
        Scenario::new("api", "search product", |c| api_checks::search_product(c).boxed()),
        Scenario::new("api", "verify login invalid", |c| {
            api_checks::verify_login_invalid(c).boxed()
        }),
        Scenario::new("api", "create, read, delete account", |c| {
            api_checks::create_read_delete_account(c).boxed()
        }),
    ]
}

/// Suite names in run order, without duplicates
#[must_use]
pub fn suites() -> Vec<&'static str> {
    let mut suites: Vec<&'static str> = Vec::new();
    for scenario in all() {
        if !suites.contains(&scenario.suite) {
            suites.push(scenario.suite);
        }
    }
    suites
}

/// Await `flow`; if it fails, delete the account it may have created.
///
/// Flows that register a fresh email run through this so an aborted run
/// leaves no account on the storefront. A cleanup failure is logged and the
/// flow's own error is returned.
pub(crate) async fn deleting_on_failure<T>(
    ctx: &ScenarioContext,
    email: &str,
    password: &str,
    flow: impl Future<Output = ShopResult<T>>,
) -> ShopResult<T> {
    let result = flow.await;
    if let Err(failure) = &result {
        info!(email, error = %failure, "flow failed, deleting its account");
        if let Err(e) = ctx.api().ensure_deleted(email, password).await {
            warn!(email, error = %e, "account cleanup failed");
        }
    }
    result
}

/// Fail the scenario with `message` unless `condition` holds
pub(crate) fn ensure(condition: bool, message: impl FnOnce() -> String) -> ShopResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ShopError::assertion(message()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::driver::{Driver, FnFactory};
    use crate::suite::{Silent, SuiteRunner};
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_ids_are_unique() {
        let all = all();
        let ids: HashSet<String> = all.iter().map(Scenario::id).collect();
        assert_eq!(ids.len(), all.len());
        let slugs: HashSet<String> = all.iter().map(Scenario::slug).collect();
        assert_eq!(slugs.len(), all.len());
    }

    #[test]
    fn test_suites_in_order() {
        assert_eq!(
            suites(),
            ["account", "products", "home", "cart", "checkout", "contact", "api"]
        );
    }

    mod cleanup_tests {
        use super::*;
        use crate::data::UserProfile;

        #[tokio::test]
        async fn test_failed_flow_deletes_account() {
            let shop = fake_shop::FakeShop::start().await;
            let ctx = shop.context();
            let profile = UserProfile::fresh();
            shop.seed_account(&profile);

            let err = deleting_on_failure(&ctx, &profile.email, &profile.password, async {
                Err::<(), _>(ShopError::assertion("payment declined"))
            })
            .await
            .unwrap_err();
            assert!(err.to_string().contains("payment declined"));
            assert!(shop.no_accounts());
        }

        #[tokio::test]
        async fn test_passing_flow_keeps_account() {
            let shop = fake_shop::FakeShop::start().await;
            let ctx = shop.context();
            let profile = UserProfile::fresh();
            shop.seed_account(&profile);

            deleting_on_failure(&ctx, &profile.email, &profile.password, async { Ok(()) })
                .await
                .unwrap();
            assert!(shop.has_account(&profile.email));
        }

        #[tokio::test]
        async fn test_absent_account_keeps_original_error() {
            let shop = fake_shop::FakeShop::start().await;
            let ctx = shop.context();
            let err = deleting_on_failure(&ctx, "nobody@example.com", "x", async {
                Err::<(), _>(ShopError::assertion("signup form missing"))
            })
            .await
            .unwrap_err();
            assert!(err.to_string().contains("signup form missing"));
        }
    }

    #[test]
    fn test_ensure() {
        assert!(ensure(true, || unreachable!()).is_ok());
        let err = ensure(false, || "cart is empty".to_string()).unwrap_err();
        assert!(err.to_string().contains("cart is empty"));
    }

    /// The whole registry passes against the scripted storefront
    #[tokio::test]
    async fn test_every_scenario_passes_offline() {
        let shop = fake_shop::FakeShop::start().await;
        let dir = tempfile::tempdir().unwrap();
        let runner = SuiteRunner::new(SuiteConfig {
            base_url: fake_shop::BASE.to_string(),
            api_base_url: Some(shop.api_url()),
            action_timeout_ms: 200,
            navigation_timeout_ms: 200,
            output_dir: dir.path().to_path_buf(),
            ..SuiteConfig::default()
        })
        .unwrap();
        let accounts = shop.accounts.clone();
        let factory = FnFactory(move || {
            Ok(fake_shop::storefront(&accounts) as Arc<dyn Driver>)
        });

        let reporter = runner.run(&all(), &factory, &mut Silent).await;
        let failures: Vec<String> = reporter
            .failures()
            .iter()
            .map(|r| format!("{}: {}", r.id(), r.error.clone().unwrap_or_default()))
            .collect();
        assert!(failures.is_empty(), "{failures:#?}");
        assert_eq!(reporter.passed_count(), all().len());
    }
}

//! Signup, login, logout and account deletion.

use tracing::info;

use super::{deleting_on_failure, ensure};
use crate::data::{UserProfile, DEMO_ACCOUNT, INVALID_CREDENTIALS};
use crate::page_object::PageObject;
use crate::pages::SignupStart;
use crate::result::ShopResult;
use crate::scenario::ScenarioContext;

/// Which way [`ensure_account`] went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountBranch {
    /// The email was new; the account was created through the signup form
    Registered,
    /// The email was already registered; logged in with the profile's password
    LoggedIn,
}

/// The standing account used by the login scenarios
#[must_use]
pub fn demo_profile() -> UserProfile {
    let mut profile = UserProfile::with_email(DEMO_ACCOUNT.email);
    profile.password = DEMO_ACCOUNT.password.to_string();
    profile
}

/// Leave the browser logged in as `profile`, registering it if needed.
///
/// Signup is attempted first; if the storefront answers "Email Address
/// already exist!" the flow logs in instead. Either way the API must then
/// confirm the credentials.
pub async fn ensure_account(
    ctx: &ScenarioContext,
    profile: &UserProfile,
) -> ShopResult<AccountBranch> {
    let login = ctx.login();
    ctx.step("open signup / login", login.open()).await?;
    ctx.step("verify signup form", login.verify_signup_form_visible())
        .await?;
    let start = ctx
        .step(
            "start signup",
            login.start_signup(&profile.name, &profile.email),
        )
        .await?;

    let branch = match start {
        SignupStart::AccountInfo => {
            complete_signup(ctx, profile).await?;
            AccountBranch::Registered
        }
        SignupStart::EmailExists => {
            ctx.step("verify email exists error", login.verify_email_exists_error())
                .await?;
            ctx.step("log in instead", login.login(&profile.email, &profile.password))
                .await?;
            AccountBranch::LoggedIn
        }
    };
    info!(email = %profile.email, ?branch, "account ready");

    ctx.step(
        "verify logged in",
        ctx.header().verify_logged_in_as(&profile.name),
    )
    .await?;
    let known = ctx
        .step(
            "API confirms credentials",
            ctx.api().account_exists(&profile.email, &profile.password),
        )
        .await?;
    ensure(known, || {
        format!(
            "logged in as {} but verifyLogin rejects the credentials",
            profile.email
        )
    })?;
    Ok(branch)
}

/// From the account-information form to "Account Created!" and back home
async fn complete_signup(ctx: &ScenarioContext, profile: &UserProfile) -> ShopResult<()> {
    let signup = ctx.signup();
    ctx.step("verify account information form", signup.verify_account_info_visible())
        .await?;
    ctx.step("fill account information", signup.fill_signup_form(profile))
        .await?;
    ctx.step("create account", signup.click_create_account())
        .await?;
    let status = ctx.account_status();
    ctx.step("verify account created", status.verify_account_created())
        .await?;
    ctx.step("continue", status.continue_to_home()).await
}

/// Delete the logged-in account from the header
pub async fn delete_logged_in_account(ctx: &ScenarioContext) -> ShopResult<()> {
    ctx.step("delete account", ctx.header().delete_account())
        .await?;
    let status = ctx.account_status();
    ctx.step("verify account deleted", status.verify_account_deleted())
        .await?;
    ctx.step("continue", status.continue_to_home()).await
}

/// Register a fresh user from the home page, then delete it
pub async fn register_user(ctx: &ScenarioContext) -> ShopResult<()> {
    let profile = UserProfile::fresh();
    deleting_on_failure(ctx, &profile.email, &profile.password, async {
        let home = ctx.home();
        ctx.step("open home", home.goto()).await?;
        ctx.step("verify home page", home.verify_home_page_visible())
            .await?;
        ctx.step("open signup / login", ctx.header().open_signup_login())
            .await?;

        let login = ctx.login();
        ctx.step("verify signup form", login.verify_signup_form_visible())
            .await?;
        let start = ctx
            .step(
                "start signup",
                login.start_signup(&profile.name, &profile.email),
            )
            .await?;
        ensure(start == SignupStart::AccountInfo, || {
            format!("fresh email {} reported as already registered", profile.email)
        })?;

        complete_signup(ctx, &profile).await?;
        ctx.step(
            "verify logged in",
            ctx.header().verify_logged_in_as(&profile.name),
        )
        .await?;
        delete_logged_in_account(ctx).await
    })
    .await
}

/// Signup followed by deletion leaves no account behind
pub async fn register_and_delete_restores_state(ctx: &ScenarioContext) -> ShopResult<()> {
    let profile = UserProfile::fresh();
    deleting_on_failure(ctx, &profile.email, &profile.password, async {
        let api = ctx.api();
        let before = ctx
            .step(
                "API: account absent",
                api.account_exists(&profile.email, &profile.password),
            )
            .await?;
        ensure(!before, || format!("{} exists before signup", profile.email))?;

        let branch = ensure_account(ctx, &profile).await?;
        ensure(branch == AccountBranch::Registered, || {
            format!("{} was not registered by this run", profile.email)
        })?;
        delete_logged_in_account(ctx).await?;

        ctx.step("API: verifyLogin answers 404", async {
            api.verify_login(&profile.email, &profile.password)
                .await?
                .expect_code("/api/verifyLogin", 404)
        })
        .await?;

        let login = ctx.login();
        ctx.step("open login", login.open()).await?;
        ctx.step(
            "log in with deleted account",
            login.login(&profile.email, &profile.password),
        )
        .await?;
        ctx.step("verify login rejected", login.verify_login_error())
            .await
    })
    .await
}

/// Log in with the standing account and log out again
pub async fn login_with_valid_credentials(ctx: &ScenarioContext) -> ShopResult<()> {
    let profile = demo_profile();
    ensure_account(ctx, &profile).await?;
    let header = ctx.header();
    ctx.step("log out", header.logout()).await?;

    let login = ctx.login();
    ctx.step("verify login form", login.verify_login_form_visible())
        .await?;
    ctx.step("log in", login.login(&profile.email, &profile.password))
        .await?;
    ctx.step("verify logged in", header.verify_logged_in_as(&profile.name))
        .await?;
    ctx.step("log out", header.logout()).await?;
    ctx.step("verify logged out", header.verify_logged_out())
        .await
}

/// Unknown credentials show an error and keep the user on `/login`
pub async fn login_with_invalid_credentials(ctx: &ScenarioContext) -> ShopResult<()> {
    let login = ctx.login();
    ctx.step("open login", login.open()).await?;
    ctx.step("verify login form", login.verify_login_form_visible())
        .await?;
    ctx.step(
        "log in with invalid credentials",
        login.login(INVALID_CREDENTIALS.email, INVALID_CREDENTIALS.password),
    )
    .await?;
    ctx.step("verify login error", login.verify_login_error())
        .await?;
    ctx.step("verify not logged in", ctx.header().verify_logged_out())
        .await
}

/// Signing up with a registered email takes the login branch
pub async fn register_with_existing_email(ctx: &ScenarioContext) -> ShopResult<()> {
    let profile = demo_profile();
    ensure_account(ctx, &profile).await?;
    ctx.step("log out", ctx.header().logout()).await?;

    let branch = ensure_account(ctx, &profile).await?;
    ensure(branch == AccountBranch::LoggedIn, || {
        format!("signup with registered email {} did not branch to login", profile.email)
    })?;
    ctx.step("log out", ctx.header().logout()).await
}

/// Logging out lands on `/login` with no session
pub async fn logout(ctx: &ScenarioContext) -> ShopResult<()> {
    ensure_account(ctx, &demo_profile()).await?;
    let header = ctx.header();
    ctx.step("log out", header.logout()).await?;
    ctx.step("verify logged out", header.verify_logged_out())
        .await?;
    ctx.step("verify login form", ctx.login().verify_login_form_visible())
        .await
}

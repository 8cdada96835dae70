//! The combined "Signup / Login" page.

use tracing::debug;

use super::SignupStart;
use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::{ShopError, ShopResult};
use crate::wait::{poll_until, Probe};

pub const LOGIN_ERROR: &str = "Your email or password is incorrect!";
pub const EMAIL_EXISTS_ERROR: &str = "Email Address already exist!";

/// `/login`: "Login to your account" on the left, "New User Signup!" on the right
#[derive(Debug, Clone)]
pub struct LoginPage {
    page: Page,
    pub login_heading: Locator,
    pub login_email: Locator,
    pub login_password: Locator,
    pub login_button: Locator,
    pub login_error: Locator,
    pub signup_heading: Locator,
    pub signup_name: Locator,
    pub signup_email: Locator,
    pub signup_button: Locator,
    pub signup_error: Locator,
    account_info_heading: Locator,
}

impl LoginPage {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            login_heading: Locator::new(".login-form h2"),
            login_email: Locator::data_qa("login-email"),
            login_password: Locator::data_qa("login-password"),
            login_button: Locator::data_qa("login-button"),
            login_error: Locator::new(".login-form form p"),
            signup_heading: Locator::new(".signup-form h2"),
            signup_name: Locator::data_qa("signup-name"),
            signup_email: Locator::data_qa("signup-email"),
            signup_button: Locator::data_qa("signup-button"),
            signup_error: Locator::new(".signup-form form p"),
            account_info_heading: Locator::text("Enter Account Information"),
        }
    }

    pub async fn verify_login_form_visible(&self) -> ShopResult<()> {
        self.page
            .expect(&self.login_heading)
            .to_have_text("Login to your account")
            .await
    }

    pub async fn verify_signup_form_visible(&self) -> ShopResult<()> {
        self.page
            .expect(&self.signup_heading)
            .to_have_text("New User Signup!")
            .await
    }

    /// Submit the login form
    pub async fn login(&self, email: &str, password: &str) -> ShopResult<()> {
        debug!(email, "login");
        self.page.fill(&self.login_email, email).await?;
        self.page.fill(&self.login_password, password).await?;
        self.page.click(&self.login_button).await
    }

    /// Rejected credentials: error shown and still on `/login`
    pub async fn verify_login_error(&self) -> ShopResult<()> {
        self.page
            .expect(&self.login_error)
            .to_have_text(LOGIN_ERROR)
            .await?;
        self.page.expect_path("/login").await
    }

    /// Submit the signup form and report which way the site went
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if neither the account-information form
    /// nor the email-exists error appears in time
    pub async fn start_signup(&self, name: &str, email: &str) -> ShopResult<SignupStart> {
        debug!(name, email, "start signup");
        self.page.fill(&self.signup_name, name).await?;
        self.page.fill(&self.signup_email, email).await?;
        self.page.click(&self.signup_button).await?;

        let page = &self.page;
        let info = &self.account_info_heading;
        let error = &self.signup_error;
        let settings = page.settings();
        let options = settings.wait_options(settings.navigation_timeout);
        poll_until(options, "signup to branch", move || async move {
            if page.is_visible(info).await? {
                return Ok(Probe::Ready(SignupStart::AccountInfo));
            }
            let errors = page.all_texts(error).await?;
            if errors.iter().any(|t| t == EMAIL_EXISTS_ERROR) {
                return Ok(Probe::Ready(SignupStart::EmailExists));
            }
            Ok(Probe::Pending(String::new()))
        })
        .await
        .map_err(|e| match e {
            ShopError::Timeout { ms, .. } => ShopError::assertion(format!(
                "neither account information form nor '{EMAIL_EXISTS_ERROR}' within {ms}ms"
            )),
            other => other,
        })
    }

    pub async fn verify_email_exists_error(&self) -> ShopResult<()> {
        self.page
            .expect(&self.signup_error)
            .to_have_text(EMAIL_EXISTS_ERROR)
            .await
    }
}

impl PageObject for LoginPage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        "/login"
    }

    fn ready_marker(&self) -> Option<&Locator> {
        Some(&self.login_button)
    }
}

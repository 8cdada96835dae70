//! Site header navigation, present on every page.

use crate::locator::Locator;
use crate::page::Page;
use crate::result::ShopResult;

/// Top navigation bar
#[derive(Debug, Clone)]
pub struct Header {
    page: Page,
    pub home: Locator,
    pub products: Locator,
    pub cart: Locator,
    pub signup_login: Locator,
    pub contact_us: Locator,
    pub logout: Locator,
    pub delete_account: Locator,
    pub logged_in_as: Locator,
}

fn nav(href: &str) -> Locator {
    Locator::new(format!(".shop-menu a[href=\"{href}\"]"))
}

impl Header {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            home: nav("/"),
            products: nav("/products"),
            cart: nav("/view_cart"),
            signup_login: nav("/login"),
            contact_us: nav("/contact_us"),
            logout: nav("/logout"),
            delete_account: nav("/delete_account"),
            logged_in_as: Locator::text("Logged in as"),
        }
    }

    pub async fn open_home(&self) -> ShopResult<()> {
        self.page.click(&self.home).await
    }

    pub async fn open_products(&self) -> ShopResult<()> {
        self.page.click(&self.products).await
    }

    pub async fn open_cart(&self) -> ShopResult<()> {
        self.page.click(&self.cart).await
    }

    pub async fn open_signup_login(&self) -> ShopResult<()> {
        self.page.click(&self.signup_login).await
    }

    pub async fn open_contact_us(&self) -> ShopResult<()> {
        self.page.click(&self.contact_us).await
    }

    /// Log out; the site redirects to `/login`
    pub async fn logout(&self) -> ShopResult<()> {
        self.page.click(&self.logout).await?;
        self.page.expect_path("/login").await
    }

    /// Delete the logged-in account; lands on the "Account Deleted!" page
    pub async fn delete_account(&self) -> ShopResult<()> {
        self.page.click(&self.delete_account).await?;
        self.page.expect_path("/delete_account").await
    }

    /// "Logged in as <name>" is shown
    pub async fn verify_logged_in_as(&self, name: &str) -> ShopResult<()> {
        self.page
            .expect(&self.logged_in_as)
            .to_contain_text(format!("Logged in as {name}"))
            .await
    }

    /// No session: the "Signup / Login" link is back and "Logged in as" is gone
    pub async fn verify_logged_out(&self) -> ShopResult<()> {
        self.page.expect(&self.signup_login).to_be_visible().await?;
        self.page.expect(&self.logged_in_as).to_be_hidden().await
    }

    /// Whether a session is active right now; does not wait
    pub async fn is_logged_in(&self) -> ShopResult<bool> {
        self.page.is_visible(&self.logout).await
    }
}

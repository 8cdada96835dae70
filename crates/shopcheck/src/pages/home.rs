//! Home page with the footer subscription widget.

use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::ShopResult;

#[derive(Debug, Clone)]
pub struct HomePage {
    page: Page,
    pub slider: Locator,
    pub subscription_heading: Locator,
    pub subscribe_email: Locator,
    pub subscribe_button: Locator,
    pub subscribe_success: Locator,
}

impl HomePage {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            slider: Locator::new("#slider-carousel"),
            subscription_heading: Locator::new(".single-widget h2").with_text("Subscription"),
            // the site spells the id this way
            subscribe_email: Locator::new("#susbscribe_email"),
            subscribe_button: Locator::new("#subscribe"),
            subscribe_success: Locator::new("#success-subscribe"),
        }
    }

    pub async fn goto(&self) -> ShopResult<()> {
        self.open().await
    }

    pub async fn verify_home_page_visible(&self) -> ShopResult<()> {
        self.wait_until_loaded().await
    }

    pub async fn subscribe(&self, email: &str) -> ShopResult<()> {
        self.page.expect(&self.subscription_heading).to_be_visible().await?;
        self.page.fill(&self.subscribe_email, email).await?;
        self.page.click(&self.subscribe_button).await
    }

    pub async fn verify_subscribed(&self) -> ShopResult<()> {
        self.page
            .expect(&self.subscribe_success)
            .to_contain_text("You have been successfully subscribed!")
            .await
    }
}

impl PageObject for HomePage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        "/"
    }

    fn ready_marker(&self) -> Option<&Locator> {
        Some(&self.slider)
    }
}

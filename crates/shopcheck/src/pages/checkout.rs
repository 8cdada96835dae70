//! Checkout review page `/checkout`.

use crate::data::UserProfile;
use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::ShopResult;

#[derive(Debug, Clone)]
pub struct CheckoutPage {
    page: Page,
    pub address_heading: Locator,
    pub delivery_address: Locator,
    pub invoice_address: Locator,
    pub review_heading: Locator,
    pub order_rows: Locator,
    pub comment: Locator,
    pub place_order: Locator,
}

impl CheckoutPage {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            address_heading: Locator::text("Address Details"),
            delivery_address: Locator::new("#address_delivery"),
            invoice_address: Locator::new("#address_invoice"),
            review_heading: Locator::text("Review Your Order"),
            order_rows: Locator::new("#cart_info tbody tr"),
            comment: Locator::new("textarea[name=\"message\"]"),
            place_order: Locator::new("a[href=\"/payment\"]"),
        }
    }

    /// Delivery and billing blocks both show the profile's address
    pub async fn verify_address_details(&self, profile: &UserProfile) -> ShopResult<()> {
        self.page.expect(&self.address_heading).to_be_visible().await?;
        let a = &profile.address;
        for block in [&self.delivery_address, &self.invoice_address] {
            for part in [
                &a.first_name,
                &a.last_name,
                &a.company,
                &a.address1,
                &a.address2,
                &a.city,
                &a.state,
                &a.zipcode,
                &a.country,
                &a.mobile_number,
            ] {
                self.page.expect(block).to_contain_text(part.as_str()).await?;
            }
        }
        Ok(())
    }

    pub async fn verify_review_order(&self) -> ShopResult<()> {
        self.page.expect(&self.review_heading).to_be_visible().await?;
        self.page
            .expect(&self.order_rows.clone().first())
            .to_be_visible()
            .await
    }

    pub async fn add_comment(&self, text: &str) -> ShopResult<()> {
        self.page.fill(&self.comment, text).await
    }

    pub async fn place_order(&self) -> ShopResult<()> {
        self.page.click(&self.place_order).await?;
        self.page.expect_path("/payment").await
    }
}

impl PageObject for CheckoutPage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        "/checkout"
    }

    fn ready_marker(&self) -> Option<&Locator> {
        Some(&self.place_order)
    }
}

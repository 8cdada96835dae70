//! Single product page `/product_details/{id}`.

use crate::data::parse_price;
use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::{ShopError, ShopResult};

#[derive(Debug, Clone)]
pub struct ProductDetailPage {
    page: Page,
    path: String,
    pub name: Locator,
    pub category: Locator,
    pub price: Locator,
    pub availability: Locator,
    pub quantity: Locator,
    pub add_to_cart: Locator,
    pub added_modal: Locator,
    pub modal_view_cart: Locator,
}

impl ProductDetailPage {
    #[must_use]
    pub fn new(page: &Page, product_id: u32) -> Self {
        Self {
            page: page.clone(),
            path: format!("/product_details/{product_id}"),
            name: Locator::new(".product-information h2"),
            category: Locator::new(".product-information p").with_text("Category:"),
            price: Locator::new(".product-information span span"),
            availability: Locator::new(".product-information p").with_text("Availability:"),
            quantity: Locator::new("#quantity"),
            add_to_cart: Locator::new(".product-information button.cart"),
            added_modal: Locator::new("#cartModal .modal-content"),
            modal_view_cart: Locator::new("#cartModal a[href=\"/view_cart\"]"),
        }
    }

    /// Name, category, price and availability are all shown
    pub async fn verify_details_visible(&self) -> ShopResult<()> {
        for locator in [&self.name, &self.category, &self.price, &self.availability] {
            self.page.expect(locator).to_be_visible().await?;
        }
        Ok(())
    }

    pub async fn product_name(&self) -> ShopResult<String> {
        self.page.text_content(&self.name).await
    }

    /// Displayed unit price in rupees
    pub async fn unit_price(&self) -> ShopResult<u32> {
        let text = self.page.text_content(&self.price).await?;
        parse_price(&text)
            .ok_or_else(|| ShopError::assertion(format!("unreadable price '{text}'")))
    }

    pub async fn set_quantity(&self, quantity: u32) -> ShopResult<()> {
        self.page.fill(&self.quantity, &quantity.to_string()).await
    }

    /// Add to cart and wait for the confirmation modal
    pub async fn add_to_cart(&self) -> ShopResult<()> {
        self.page.click(&self.add_to_cart).await?;
        self.page.expect(&self.added_modal).to_be_visible().await
    }

    pub async fn view_cart(&self) -> ShopResult<()> {
        self.page.click(&self.modal_view_cart).await?;
        self.page.expect_path("/view_cart").await
    }
}

impl PageObject for ProductDetailPage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn url_pattern(&self) -> &str {
        "/product_details/:id"
    }

    fn ready_marker(&self) -> Option<&Locator> {
        Some(&self.name)
    }
}

//! Payment form `/payment` and the order confirmation that follows.

use crate::data::PaymentCard;
use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::ShopResult;

#[derive(Debug, Clone)]
pub struct PaymentPage {
    page: Page,
    pub name_on_card: Locator,
    pub card_number: Locator,
    pub cvc: Locator,
    pub expiry_month: Locator,
    pub expiry_year: Locator,
    pub pay_button: Locator,
    pub order_placed: Locator,
    pub confirmation: Locator,
}

impl PaymentPage {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            name_on_card: Locator::data_qa("name-on-card"),
            card_number: Locator::data_qa("card-number"),
            cvc: Locator::data_qa("cvc"),
            expiry_month: Locator::data_qa("expiry-month"),
            expiry_year: Locator::data_qa("expiry-year"),
            pay_button: Locator::data_qa("pay-button"),
            order_placed: Locator::data_qa("order-placed"),
            confirmation: Locator::text("Congratulations! Your order has been confirmed!"),
        }
    }

    pub async fn fill_card(&self, card: &PaymentCard) -> ShopResult<()> {
        let p = &self.page;
        p.fill(&self.name_on_card, &card.name_on_card).await?;
        p.fill(&self.card_number, &card.number).await?;
        p.fill(&self.cvc, &card.cvc).await?;
        p.fill(&self.expiry_month, &card.expiry_month).await?;
        p.fill(&self.expiry_year, &card.expiry_year).await
    }

    /// Pay; the site moves to `/payment_done/<amount>`
    pub async fn pay_and_confirm(&self) -> ShopResult<()> {
        self.page.click(&self.pay_button).await?;
        self.page.expect_path("/payment_done/**").await
    }

    pub async fn verify_order_placed(&self) -> ShopResult<()> {
        self.page
            .expect(&self.order_placed)
            .to_contain_text("Order Placed!")
            .await?;
        self.page.expect(&self.confirmation).to_be_visible().await
    }
}

impl PageObject for PaymentPage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        "/payment"
    }

    fn ready_marker(&self) -> Option<&Locator> {
        Some(&self.pay_button)
    }
}

//! Shopping cart `/view_cart`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::parse_price;
use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::{ShopError, ShopResult};

/// One row of the cart table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub name: String,
    /// Unit price in rupees
    pub price: u32,
    pub quantity: u32,
    /// Line total in rupees, as displayed
    pub total: u32,
}

impl CartLine {
    /// Whether the displayed total is price × quantity
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        u64::from(self.price) * u64::from(self.quantity) == u64::from(self.total)
    }
}

/// Sum of line totals
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> u64 {
    lines.iter().map(|l| u64::from(l.total)).sum()
}

#[derive(Debug, Clone)]
pub struct CartPage {
    page: Page,
    pub table: Locator,
    pub row_names: Locator,
    pub row_prices: Locator,
    pub row_quantities: Locator,
    pub row_totals: Locator,
    pub empty_cart: Locator,
    pub proceed_to_checkout: Locator,
    pub checkout_modal_login: Locator,
}

impl CartPage {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            table: Locator::new("#cart_info_table"),
            row_names: Locator::new("#cart_info_table .cart_description h4 a"),
            row_prices: Locator::new("#cart_info_table .cart_price p"),
            row_quantities: Locator::new("#cart_info_table .cart_quantity button"),
            row_totals: Locator::new("#cart_info_table .cart_total_price"),
            empty_cart: Locator::new("#empty_cart"),
            proceed_to_checkout: Locator::new("a.check_out"),
            checkout_modal_login: Locator::new("#checkoutModal a[href=\"/login\"]"),
        }
    }

    /// Remove link for a product's row
    #[must_use]
    pub fn remove_link(product_id: u32) -> Locator {
        Locator::new(format!(
            "a.cart_quantity_delete[data-product-id=\"{product_id}\"]"
        ))
    }

    pub async fn verify_cart_visible(&self) -> ShopResult<()> {
        self.wait_until_loaded().await
    }

    /// Read every row of the cart table
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` if the columns disagree in length or a
    /// number cannot be read
    pub async fn lines(&self) -> ShopResult<Vec<CartLine>> {
        let names = self.page.all_texts(&self.row_names).await?;
        let prices = self.page.all_texts(&self.row_prices).await?;
        let quantities = self.page.all_texts(&self.row_quantities).await?;
        let totals = self.page.all_texts(&self.row_totals).await?;

        if [prices.len(), quantities.len(), totals.len()]
            .iter()
            .any(|&n| n != names.len())
        {
            return Err(ShopError::assertion(format!(
                "cart table is ragged: {} names, {} prices, {} quantities, {} totals",
                names.len(),
                prices.len(),
                quantities.len(),
                totals.len()
            )));
        }

        names
            .into_iter()
            .zip(prices)
            .zip(quantities)
            .zip(totals)
            .map(|(((name, price), quantity), total)| {
                let number = |field: &str, text: &str| {
                    parse_price(text).ok_or_else(|| {
                        ShopError::assertion(format!("unreadable {field} '{text}' for {name}"))
                    })
                };
                Ok(CartLine {
                    price: number("price", &price)?,
                    quantity: number("quantity", &quantity)?,
                    total: number("total", &total)?,
                    name,
                })
            })
            .collect()
    }

    /// Sum of the displayed line totals
    pub async fn total(&self) -> ShopResult<u64> {
        Ok(cart_total(&self.lines().await?))
    }

    pub async fn remove(&self, product_id: u32) -> ShopResult<()> {
        debug!(product_id, "remove from cart");
        let link = Self::remove_link(product_id);
        self.page.click(&link).await?;
        self.page.expect(&link).to_be_hidden().await
    }

    pub async fn verify_empty(&self) -> ShopResult<()> {
        self.page
            .expect(&self.empty_cart)
            .to_contain_text("Cart is empty!")
            .await
    }

    pub async fn proceed_to_checkout(&self) -> ShopResult<()> {
        self.page.click(&self.proceed_to_checkout).await
    }

    /// Guest checkout shows a modal; follow its "Register / Login" link
    pub async fn register_login_from_modal(&self) -> ShopResult<()> {
        self.page.click(&self.checkout_modal_login).await?;
        self.page.expect_path("/login").await
    }
}

impl PageObject for CartPage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        "/view_cart"
    }

    fn ready_marker(&self) -> Option<&Locator> {
        Some(&self.table)
    }
}

//! "All Products" listing, search and add-to-cart modal.

use tracing::debug;

use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::{ShopError, ShopResult};

#[derive(Debug, Clone)]
pub struct ProductsPage {
    page: Page,
    pub heading: Locator,
    pub product_cards: Locator,
    pub product_names: Locator,
    pub search_input: Locator,
    pub search_button: Locator,
    pub added_modal: Locator,
    pub continue_shopping: Locator,
    pub modal_view_cart: Locator,
}

impl ProductsPage {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            heading: Locator::new(".features_items h2.title"),
            product_cards: Locator::new(".features_items .product-image-wrapper"),
            product_names: Locator::new(".features_items .productinfo p"),
            search_input: Locator::new("#search_product"),
            search_button: Locator::new("#submit_search"),
            added_modal: Locator::new("#cartModal .modal-content"),
            continue_shopping: Locator::new("#cartModal button.close-modal"),
            modal_view_cart: Locator::new("#cartModal a[href=\"/view_cart\"]"),
        }
    }

    /// "Add to cart" button on a product's card
    #[must_use]
    pub fn add_to_cart_button(product_id: u32) -> Locator {
        Locator::new(format!(".productinfo a[data-product-id=\"{product_id}\"]"))
    }

    /// "View Product" link on a product's card
    #[must_use]
    pub fn view_product_link(product_id: u32) -> Locator {
        Locator::new(format!("a[href=\"/product_details/{product_id}\"]"))
    }

    pub async fn goto(&self) -> ShopResult<()> {
        self.open().await
    }

    /// "All Products" heading and a non-empty product grid
    pub async fn verify_all_products_visible(&self) -> ShopResult<()> {
        self.page
            .expect(&self.heading)
            .to_have_text("All Products")
            .await?;
        self.page
            .expect(&self.product_cards.clone().first())
            .to_be_visible()
            .await
    }

    pub async fn search(&self, term: &str) -> ShopResult<()> {
        debug!(term, "search");
        self.page.fill(&self.search_input, term).await?;
        self.page.click(&self.search_button).await
    }

    /// "Searched Products" heading and every result name mentions `term`
    pub async fn verify_searched_products_visible(&self, term: &str) -> ShopResult<()> {
        self.page
            .expect(&self.heading)
            .to_have_text("Searched Products")
            .await?;
        self.page
            .expect(&self.product_names.clone().first())
            .to_be_visible()
            .await?;
        let needle = term.to_lowercase();
        let names = self.product_names().await?;
        match names.iter().find(|n| !n.to_lowercase().contains(&needle)) {
            Some(stray) => Err(ShopError::assertion(format!(
                "search result '{stray}' does not match '{term}'"
            ))),
            None => Ok(()),
        }
    }

    /// Names of the products currently listed
    pub async fn product_names(&self) -> ShopResult<Vec<String>> {
        self.page.all_texts(&self.product_names).await
    }

    /// Add a product and wait for the confirmation modal
    pub async fn add_to_cart(&self, product_id: u32) -> ShopResult<()> {
        debug!(product_id, "add to cart");
        self.page.click(&Self::add_to_cart_button(product_id)).await?;
        self.page.expect(&self.added_modal).to_be_visible().await
    }

    /// Close the modal and stay on the listing
    pub async fn continue_shopping(&self) -> ShopResult<()> {
        self.page.click(&self.continue_shopping).await?;
        self.page.expect(&self.added_modal).to_be_hidden().await
    }

    /// Follow the modal's "View Cart" link
    pub async fn view_cart(&self) -> ShopResult<()> {
        self.page.click(&self.modal_view_cart).await?;
        self.page.expect_path("/view_cart").await
    }

    pub async fn view_product(&self, product_id: u32) -> ShopResult<()> {
        self.page.click(&Self::view_product_link(product_id)).await?;
        self.page.expect_path("/product_details/:id").await
    }
}

impl PageObject for ProductsPage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        "/products"
    }

    fn ready_marker(&self) -> Option<&Locator> {
        Some(&self.heading)
    }
}

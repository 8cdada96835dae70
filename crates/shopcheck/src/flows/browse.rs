//! Browsing without an account: product search, product details, newsletter.

use super::ensure;
use crate::data::{unique_email, CATALOG, SEARCH_TERM};
use crate::result::ShopResult;
use crate::scenario::ScenarioContext;

/// Search the listing; every result mentions the term and the API agrees
/// there are hits
pub async fn search_product(ctx: &ScenarioContext) -> ShopResult<()> {
    let products = ctx.products();
    ctx.step("open products", products.goto()).await?;
    ctx.step("verify all products", products.verify_all_products_visible())
        .await?;
    ctx.step("search", products.search(SEARCH_TERM)).await?;
    ctx.step(
        "verify searched products",
        products.verify_searched_products_visible(SEARCH_TERM),
    )
    .await?;

    let hits = ctx
        .step("API: search product", async {
            ctx.api()
                .search_product(SEARCH_TERM)
                .await?
                .expect_code("/api/searchProduct", 200)
        })
        .await?;
    ensure(!hits.products.is_empty(), || {
        format!("API search for '{SEARCH_TERM}' returned nothing")
    })
}

/// The detail page shows the product's name, category, price and stock
pub async fn view_product_details(ctx: &ScenarioContext) -> ShopResult<()> {
    let product = CATALOG[0];
    let products = ctx.products();
    ctx.step("open products", products.goto()).await?;
    ctx.step("view product", products.view_product(product.id))
        .await?;

    let detail = ctx.product_detail(product.id);
    ctx.step("verify product details", detail.verify_details_visible())
        .await?;
    let name = ctx.step("read name", detail.product_name()).await?;
    ensure(name == product.name, || {
        format!("detail page shows '{name}', expected '{}'", product.name)
    })?;
    let price = ctx.step("read price", detail.unit_price()).await?;
    ensure(price == product.price, || {
        format!("{} costs {price}, expected {}", product.name, product.price)
    })
}

/// Subscribe to the newsletter from the home page footer
pub async fn subscribe(ctx: &ScenarioContext) -> ShopResult<()> {
    let home = ctx.home();
    ctx.step("open home", home.goto()).await?;
    ctx.step("verify home page", home.verify_home_page_visible())
        .await?;
    ctx.step(
        "subscribe",
        home.subscribe(&unique_email("shopcheck.news", "example.com")),
    )
    .await?;
    ctx.step("verify subscribed", home.verify_subscribed())
        .await
}

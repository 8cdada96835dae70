//! Cart and checkout flows.

use super::account::{delete_logged_in_account, ensure_account};
use super::{deleting_on_failure, ensure};
use crate::data::{PaymentCard, Product, UserProfile, CATALOG};
use crate::page_object::PageObject;
use crate::pages::{cart_total, CartLine};
use crate::result::{ShopError, ShopResult};
use crate::scenario::ScenarioContext;

/// Check cart lines against the products and quantities that were added.
///
/// Every expected product has exactly one line with its catalog price and
/// quantity, every line total is price × quantity, and the cart total is
/// the sum of those products.
pub fn verify_cart_contents(lines: &[CartLine], expected: &[(Product, u32)]) -> ShopResult<()> {
    ensure(lines.len() == expected.len(), || {
        format!("cart has {} lines, expected {}", lines.len(), expected.len())
    })?;
    for (product, quantity) in expected {
        let line = lines
            .iter()
            .find(|l| l.name == product.name)
            .ok_or_else(|| ShopError::assertion(format!("{} missing from cart", product.name)))?;
        ensure(line.price == product.price, || {
            format!("{} priced {} in cart, catalog says {}", line.name, line.price, product.price)
        })?;
        ensure(line.quantity == *quantity, || {
            format!("{} has quantity {}, expected {quantity}", line.name, line.quantity)
        })?;
        ensure(line.is_consistent(), || {
            format!(
                "{} line total {} is not {} × {}",
                line.name, line.total, line.price, line.quantity
            )
        })?;
    }
    let want: u64 = expected
        .iter()
        .map(|(p, q)| u64::from(p.price) * u64::from(*q))
        .sum();
    let got = cart_total(lines);
    ensure(got == want, || format!("cart total {got}, expected {want}"))
}

/// Add the first two catalog products from the listing and check the cart
pub async fn add_products_to_cart(ctx: &ScenarioContext) -> ShopResult<()> {
    let picks = [CATALOG[0], CATALOG[1]];
    let products = ctx.products();
    ctx.step("open products", products.goto()).await?;
    ctx.step("verify all products", products.verify_all_products_visible())
        .await?;

    for (i, product) in picks.iter().enumerate() {
        ctx.step(
            &format!("add {} to cart", product.name),
            products.add_to_cart(product.id),
        )
        .await?;
        if i + 1 < picks.len() {
            ctx.step("continue shopping", products.continue_shopping())
                .await?;
        }
    }
    ctx.step("view cart", products.view_cart()).await?;

    let cart = ctx.cart();
    ctx.step("verify cart", cart.verify_cart_visible()).await?;
    let lines = ctx.step("read cart lines", cart.lines()).await?;
    let expected: Vec<(Product, u32)> = picks.iter().map(|p| (*p, 1)).collect();
    ctx.step("check prices and totals", async {
        verify_cart_contents(&lines, &expected)
    })
    .await
}

/// Quantity set on the detail page shows up in the cart
pub async fn product_quantity_in_cart(ctx: &ScenarioContext) -> ShopResult<()> {
    const QUANTITY: u32 = 4;
    let product = CATALOG[0];
    let products = ctx.products();
    ctx.step("open products", products.goto()).await?;
    ctx.step("view product", products.view_product(product.id))
        .await?;

    let detail = ctx.product_detail(product.id);
    ctx.step("verify product details", detail.verify_details_visible())
        .await?;
    ctx.step("set quantity", detail.set_quantity(QUANTITY))
        .await?;
    ctx.step("add to cart", detail.add_to_cart()).await?;
    ctx.step("view cart", detail.view_cart()).await?;

    let lines = ctx.step("read cart lines", ctx.cart().lines()).await?;
    ctx.step("check quantity", async {
        verify_cart_contents(&lines, &[(product, QUANTITY)])
    })
    .await
}

/// Removing the only product empties the cart
pub async fn remove_product(ctx: &ScenarioContext) -> ShopResult<()> {
    let product = CATALOG[0];
    let products = ctx.products();
    ctx.step("open products", products.goto()).await?;
    ctx.step("add to cart", products.add_to_cart(product.id))
        .await?;
    ctx.step("view cart", products.view_cart()).await?;

    let cart = ctx.cart();
    let lines = ctx.step("read cart lines", cart.lines()).await?;
    ensure(lines.iter().any(|l| l.name == product.name), || {
        format!("{} not in cart before removal", product.name)
    })?;
    ctx.step("remove product", cart.remove(product.id)).await?;
    ctx.step("verify cart empty", cart.verify_empty()).await
}

/// Fill in the card, pay, and see the confirmation
async fn pay(ctx: &ScenarioContext) -> ShopResult<()> {
    let payment = ctx.payment();
    ctx.step("fill card", payment.fill_card(&PaymentCard::test_card()))
        .await?;
    ctx.step("pay and confirm", payment.pay_and_confirm())
        .await?;
    ctx.step("verify order placed", payment.verify_order_placed())
        .await
}

/// Review addresses and cart, comment, then place the order
async fn review_and_place(ctx: &ScenarioContext, profile: &UserProfile) -> ShopResult<()> {
    let checkout = ctx.checkout();
    ctx.step(
        "verify address details",
        checkout.verify_address_details(profile),
    )
    .await?;
    ctx.step("verify review order", checkout.verify_review_order())
        .await?;
    ctx.step(
        "add comment",
        checkout.add_comment("Please leave the parcel at the front desk."),
    )
    .await?;
    ctx.step("place order", checkout.place_order()).await?;
    pay(ctx).await
}

/// Log in (or register), buy two products, pay, delete the account
pub async fn place_order(ctx: &ScenarioContext) -> ShopResult<()> {
    let profile = UserProfile::fresh();
    deleting_on_failure(ctx, &profile.email, &profile.password, async {
        ensure_account(ctx, &profile).await?;

        let picks = [CATALOG[0], CATALOG[2]];
        let products = ctx.products();
        ctx.step("open products", products.goto()).await?;
        for product in &picks {
            ctx.step(
                &format!("add {} to cart", product.name),
                products.add_to_cart(product.id),
            )
            .await?;
            ctx.step("continue shopping", products.continue_shopping())
                .await?;
        }

        let cart = ctx.cart();
        ctx.step("open cart", cart.open()).await?;
        let lines = ctx.step("read cart lines", cart.lines()).await?;
        let expected: Vec<(Product, u32)> = picks.iter().map(|p| (*p, 1)).collect();
        ctx.step("check cart total", async {
            verify_cart_contents(&lines, &expected)
        })
        .await?;
        ctx.step("proceed to checkout", cart.proceed_to_checkout())
            .await?;
        ctx.step("verify on checkout", ctx.page().expect_path("/checkout"))
            .await?;

        review_and_place(ctx, &profile).await?;
        delete_logged_in_account(ctx).await
    })
    .await
}

/// A guest fills the cart, registers from the checkout modal, then pays
pub async fn register_while_checking_out(ctx: &ScenarioContext) -> ShopResult<()> {
    let profile = UserProfile::fresh();
    deleting_on_failure(ctx, &profile.email, &profile.password, async {
        let product = CATALOG[1];
        let products = ctx.products();
        ctx.step("open products", products.goto()).await?;
        ctx.step("add to cart", products.add_to_cart(product.id))
            .await?;
        ctx.step("view cart", products.view_cart()).await?;

        let cart = ctx.cart();
        ctx.step("proceed to checkout as guest", cart.proceed_to_checkout())
            .await?;
        ctx.step("register / login from modal", cart.register_login_from_modal())
            .await?;
        ensure_account(ctx, &profile).await?;

        ctx.step("open cart", ctx.header().open_cart()).await?;
        ctx.step("verify cart", cart.verify_cart_visible()).await?;
        let lines = ctx.step("read cart lines", cart.lines()).await?;
        ctx.step("check cart kept", async {
            verify_cart_contents(&lines, &[(product, 1)])
        })
        .await?;
        ctx.step("proceed to checkout", cart.proceed_to_checkout())
            .await?;
        ctx.step("verify on checkout", ctx.page().expect_path("/checkout"))
            .await?;

        review_and_place(ctx, &profile).await?;
        delete_logged_in_account(ctx).await
    })
    .await
}

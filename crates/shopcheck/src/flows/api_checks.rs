//! Storefront API checks; no browser page is used.

use super::{deleting_on_failure, ensure};
use crate::data::{UserProfile, INVALID_CREDENTIALS, SEARCH_TERM};
use crate::result::ShopResult;
use crate::scenario::ScenarioContext;

pub async fn products_list(ctx: &ScenarioContext) -> ShopResult<()> {
    let resp = ctx
        .step("GET productsList", async {
            ctx.api()
                .products_list()
                .await?
                .expect_code("/api/productsList", 200)
        })
        .await?;
    ensure(!resp.products.is_empty(), || "product list is empty".to_string())?;
    let unnamed = resp
        .products
        .iter()
        .filter(|p| p.name.trim().is_empty() || p.price.trim().is_empty())
        .count();
    ensure(unnamed == 0, || {
        format!("{unnamed} products without a name or price")
    })
}

pub async fn brands_list(ctx: &ScenarioContext) -> ShopResult<()> {
    let resp = ctx
        .step("GET brandsList", async {
            ctx.api()
                .brands_list()
                .await?
                .expect_code("/api/brandsList", 200)
        })
        .await?;
    ensure(!resp.brands.is_empty(), || "brand list is empty".to_string())
}

pub async fn search_product(ctx: &ScenarioContext) -> ShopResult<()> {
    let resp = ctx
        .step("POST searchProduct", async {
            ctx.api()
                .search_product(SEARCH_TERM)
                .await?
                .expect_code("/api/searchProduct", 200)
        })
        .await?;
    ensure(!resp.products.is_empty(), || {
        format!("no products match '{SEARCH_TERM}'")
    })
}

/// Unknown credentials answer 404
pub async fn verify_login_invalid(ctx: &ScenarioContext) -> ShopResult<()> {
    ctx.step("POST verifyLogin with unknown user", async {
        ctx.api()
            .verify_login(INVALID_CREDENTIALS.email, INVALID_CREDENTIALS.password)
            .await?
            .expect_code("/api/verifyLogin", 404)
    })
    .await
    .map(|_| ())
}

/// Create (201), read back, update, delete (200), then the login is gone
pub async fn create_read_delete_account(ctx: &ScenarioContext) -> ShopResult<()> {
    let api = ctx.api();
    let mut profile = UserProfile::fresh();
    let (email, password) = (profile.email.clone(), profile.password.clone());
    deleting_on_failure(ctx, &email, &password, async {
        ctx.step("POST createAccount", async {
            api.create_account(&profile)
                .await?
                .expect_code("/api/createAccount", 201)
        })
        .await?;

        let resp = ctx
            .step("GET getUserDetailByEmail", async {
                api.user_detail_by_email(&profile.email)
                    .await?
                    .expect_code("/api/getUserDetailByEmail", 200)
            })
            .await?;
        let user = resp.user.unwrap_or_default();
        let a = &profile.address;
        for (field, got, want) in [
            ("name", &user.name, &profile.name),
            ("email", &user.email, &profile.email),
            ("first_name", &user.first_name, &a.first_name),
            ("last_name", &user.last_name, &a.last_name),
            ("city", &user.city, &a.city),
            ("country", &user.country, &a.country),
            ("zipcode", &user.zipcode, &a.zipcode),
        ] {
            ensure(got == want, || format!("user {field} is '{got}', expected '{want}'"))?;
        }

        profile.address.city = "Ottawa".to_string();
        ctx.step("PUT updateAccount", async {
            api.update_account(&profile)
                .await?
                .expect_code("/api/updateAccount", 200)
        })
        .await?;
        let updated = ctx
            .step("GET updated user", async {
                api.user_detail_by_email(&profile.email)
                    .await?
                    .expect_code("/api/getUserDetailByEmail", 200)
            })
            .await?;
        let city = updated.user.map(|u| u.city).unwrap_or_default();
        ensure(city == "Ottawa", || format!("city after update is '{city}'"))?;

        ctx.step("DELETE deleteAccount", async {
            api.delete_account(&profile.email, &profile.password)
                .await?
                .expect_code("/api/deleteAccount", 200)
        })
        .await?;
        ctx.step("POST verifyLogin after delete", async {
            api.verify_login(&profile.email, &profile.password)
                .await?
                .expect_code("/api/verifyLogin", 404)
        })
        .await
        .map(|_| ())
    })
    .await
}

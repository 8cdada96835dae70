//! Contact-us form, valid and incomplete.

use std::path::PathBuf;

use crate::data::ContactMessage;
use crate::page_object::PageObject;
use crate::result::ShopResult;
use crate::scenario::ScenarioContext;

/// Small text file to attach to the message
async fn attachment() -> ShopResult<PathBuf> {
    let path = std::env::temp_dir().join("shopcheck-contact-note.txt");
    tokio::fs::write(&path, "Order enquiry attachment from shopcheck.\n").await?;
    Ok(path)
}

/// A complete message with an attachment is accepted
pub async fn submit_contact_form(ctx: &ScenarioContext) -> ShopResult<()> {
    let home = ctx.home();
    ctx.step("open home", home.goto()).await?;
    ctx.step("open contact us", ctx.header().open_contact_us())
        .await?;

    let contact = ctx.contact();
    ctx.step("verify get in touch", contact.verify_get_in_touch_visible())
        .await?;
    let message = ContactMessage::valid().with_attachment(attachment().await?);
    ctx.step("fill form", contact.fill_form(&message)).await?;
    ctx.step("submit", contact.submit()).await?;
    ctx.step("verify success", contact.verify_success()).await?;
    ctx.step("back home", contact.go_home()).await?;
    ctx.step("verify home page", home.verify_home_page_visible())
        .await
}

/// Without an email the browser refuses to submit
pub async fn missing_required_fields(ctx: &ScenarioContext) -> ShopResult<()> {
    let contact = ctx.contact();
    ctx.step("open contact us", contact.open()).await?;
    ctx.step(
        "fill form without email",
        contact.fill_form(&ContactMessage::missing_email()),
    )
    .await?;
    ctx.step("submit", contact.submit()).await?;
    ctx.step("verify not submitted", contact.verify_not_submitted())
        .await
}

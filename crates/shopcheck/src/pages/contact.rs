//! "Contact Us" form `/contact_us`.

use std::path::Path;

use tracing::debug;

use crate::data::ContactMessage;
use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::ShopResult;

pub const CONTACT_SUCCESS: &str = "Success! Your details have been submitted successfully.";

#[derive(Debug, Clone)]
pub struct ContactPage {
    page: Page,
    pub heading: Locator,
    pub name: Locator,
    pub email: Locator,
    pub subject: Locator,
    pub message: Locator,
    pub upload: Locator,
    pub submit: Locator,
    pub success: Locator,
    pub home_button: Locator,
}

impl ContactPage {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            heading: Locator::new(".contact-form h2"),
            name: Locator::data_qa("name"),
            email: Locator::data_qa("email"),
            subject: Locator::data_qa("subject"),
            message: Locator::data_qa("message"),
            upload: Locator::new("input[name=\"upload_file\"]"),
            submit: Locator::data_qa("submit-button"),
            success: Locator::new(".contact-form .status.alert-success"),
            home_button: Locator::new("#form-section a.btn-success"),
        }
    }

    pub async fn verify_get_in_touch_visible(&self) -> ShopResult<()> {
        self.page
            .expect(&self.heading)
            .to_have_text("Get In Touch")
            .await
    }

    /// Fill the text fields; empty values are left blank
    pub async fn fill_form(&self, message: &ContactMessage) -> ShopResult<()> {
        let p = &self.page;
        for (locator, value) in [
            (&self.name, &message.name),
            (&self.email, &message.email),
            (&self.subject, &message.subject),
            (&self.message, &message.message),
        ] {
            if !value.is_empty() {
                p.fill(locator, value).await?;
            }
        }
        if let Some(path) = &message.attachment {
            self.upload_file(path).await?;
        }
        Ok(())
    }

    pub async fn upload_file(&self, path: &Path) -> ShopResult<()> {
        self.page.set_input_files(&self.upload, path).await
    }

    /// Submit, accepting the site's `confirm()` prompt
    pub async fn submit(&self) -> ShopResult<()> {
        debug!("submit contact form");
        self.page.accept_dialogs().await?;
        self.page.click(&self.submit).await
    }

    pub async fn verify_success(&self) -> ShopResult<()> {
        self.page
            .expect(&self.success)
            .to_have_text(CONTACT_SUCCESS)
            .await
    }

    /// The browser blocked submission: form still shown, no confirmation
    pub async fn verify_not_submitted(&self) -> ShopResult<()> {
        self.page.expect_path("/contact_us").await?;
        self.page.expect(&self.submit).to_be_visible().await?;
        self.page.expect(&self.success).to_be_hidden().await
    }

    pub async fn go_home(&self) -> ShopResult<()> {
        self.page.click(&self.home_button).await?;
        self.page.expect_path("/").await
    }
}

impl PageObject for ContactPage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        "/contact_us"
    }

    fn ready_marker(&self) -> Option<&Locator> {
        Some(&self.heading)
    }
}

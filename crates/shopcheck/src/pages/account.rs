//! "Account Created!" and "Account Deleted!" confirmation pages.

use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::ShopResult;

/// Both confirmation pages share one layout and a Continue button
#[derive(Debug, Clone)]
pub struct AccountStatusPage {
    page: Page,
    pub created: Locator,
    pub deleted: Locator,
    pub continue_button: Locator,
}

impl AccountStatusPage {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            created: Locator::data_qa("account-created"),
            deleted: Locator::data_qa("account-deleted"),
            continue_button: Locator::data_qa("continue-button"),
        }
    }

    pub async fn verify_account_created(&self) -> ShopResult<()> {
        self.page.expect_path("/account_created").await?;
        self.page
            .expect(&self.created)
            .to_contain_text("Account Created!")
            .await
    }

    pub async fn verify_account_deleted(&self) -> ShopResult<()> {
        self.page.expect_path("/delete_account").await?;
        self.page
            .expect(&self.deleted)
            .to_contain_text("Account Deleted!")
            .await
    }

    /// Continue back to the home page
    pub async fn continue_to_home(&self) -> ShopResult<()> {
        self.page.click(&self.continue_button).await?;
        self.page.expect_path("/").await
    }
}

impl PageObject for AccountStatusPage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        "/account_created"
    }

    fn url_pattern(&self) -> &str {
        "/*"
    }

    fn ready_marker(&self) -> Option<&Locator> {
        Some(&self.continue_button)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::pages::testing::fast_page;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_created_then_continue() {
        let driver = Arc::new(MockDriver::new());
        let page = fast_page(&driver);
        let status = AccountStatusPage::new(&page);
        driver.add_element("/account_created", status.created.selector().clone(), "Account Created!");
        driver.add_element("/account_created", status.continue_button.selector().clone(), "Continue");
        driver.on_click(status.continue_button.selector().clone(), |s| s.go("/"));

        page.goto("/account_created").await.unwrap();
        status.verify_account_created().await.unwrap();
        assert!(status.verify_account_deleted().await.is_err());
        status.continue_to_home().await.unwrap();
        assert_eq!(page.current_path().await.unwrap(), "/");
    }

    #[tokio::test]
    async fn test_deleted() {
        let driver = Arc::new(MockDriver::new());
        let page = fast_page(&driver);
        let status = AccountStatusPage::new(&page);
        driver.add_element("/delete_account", status.deleted.selector().clone(), "Account Deleted!");

        page.goto("/delete_account").await.unwrap();
        status.verify_account_deleted().await.unwrap();
    }
}

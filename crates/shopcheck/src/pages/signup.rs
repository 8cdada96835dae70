//! "Enter Account Information" form reached from the signup half of `/login`.

use tracing::debug;

use crate::data::{Title, UserProfile};
use crate::locator::Locator;
use crate::page::Page;
use crate::page_object::PageObject;
use crate::result::ShopResult;

#[derive(Debug, Clone)]
pub struct SignupPage {
    page: Page,
    pub heading: Locator,
    pub title_mr: Locator,
    pub title_mrs: Locator,
    pub password: Locator,
    pub days: Locator,
    pub months: Locator,
    pub years: Locator,
    pub newsletter: Locator,
    pub special_offers: Locator,
    pub first_name: Locator,
    pub last_name: Locator,
    pub company: Locator,
    pub address1: Locator,
    pub address2: Locator,
    pub country: Locator,
    pub state: Locator,
    pub city: Locator,
    pub zipcode: Locator,
    pub mobile_number: Locator,
    pub create_account: Locator,
}

impl SignupPage {
    #[must_use]
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            heading: Locator::text("Enter Account Information"),
            title_mr: Locator::new("#id_gender1"),
            title_mrs: Locator::new("#id_gender2"),
            password: Locator::data_qa("password"),
            days: Locator::data_qa("days"),
            months: Locator::data_qa("months"),
            years: Locator::data_qa("years"),
            newsletter: Locator::new("#newsletter"),
            special_offers: Locator::new("#optin"),
            first_name: Locator::data_qa("first_name"),
            last_name: Locator::data_qa("last_name"),
            company: Locator::data_qa("company"),
            address1: Locator::data_qa("address"),
            address2: Locator::data_qa("address2"),
            country: Locator::data_qa("country"),
            state: Locator::data_qa("state"),
            city: Locator::data_qa("city"),
            zipcode: Locator::data_qa("zipcode"),
            mobile_number: Locator::data_qa("mobile_number"),
            create_account: Locator::data_qa("create-account"),
        }
    }

    pub async fn verify_account_info_visible(&self) -> ShopResult<()> {
        self.wait_until_loaded().await
    }

    /// Fill every field of the form from a profile; name and email are
    /// prefilled by the site from the signup step
    pub async fn fill_signup_form(&self, profile: &UserProfile) -> ShopResult<()> {
        debug!(email = %profile.email, "fill signup form");
        let p = &self.page;
        let title = match profile.title {
            Title::Mr => &self.title_mr,
            Title::Mrs => &self.title_mrs,
        };
        p.check(title).await?;
        p.fill(&self.password, &profile.password).await?;

        let dob = &profile.birth_date;
        p.select_option(&self.days, &dob.day.to_string()).await?;
        p.select_option(&self.months, &dob.month.to_string()).await?;
        p.select_option(&self.years, &dob.year.to_string()).await?;

        if profile.newsletter {
            p.check(&self.newsletter).await?;
        }
        if profile.special_offers {
            p.check(&self.special_offers).await?;
        }

        let a = &profile.address;
        p.fill(&self.first_name, &a.first_name).await?;
        p.fill(&self.last_name, &a.last_name).await?;
        p.fill(&self.company, &a.company).await?;
        p.fill(&self.address1, &a.address1).await?;
        p.fill(&self.address2, &a.address2).await?;
        p.select_option(&self.country, &a.country).await?;
        p.fill(&self.state, &a.state).await?;
        p.fill(&self.city, &a.city).await?;
        p.fill(&self.zipcode, &a.zipcode).await?;
        p.fill(&self.mobile_number, &a.mobile_number).await
    }

    pub async fn click_create_account(&self) -> ShopResult<()> {
        self.page.click(&self.create_account).await?;
        self.page.expect_path("/account_created").await
    }
}

impl PageObject for SignupPage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn path(&self) -> &str {
        "/signup"
    }

    fn ready_marker(&self) -> Option<&Locator> {
        Some(&self.heading)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::pages::testing::fast_page;
    use std::sync::Arc;

    fn form_fields(signup: &SignupPage) -> Vec<&Locator> {
        vec![
            &signup.heading,
            &signup.title_mr,
            &signup.title_mrs,
            &signup.password,
            &signup.days,
            &signup.months,
            &signup.years,
            &signup.newsletter,
            &signup.special_offers,
            &signup.first_name,
            &signup.last_name,
            &signup.company,
            &signup.address1,
            &signup.address2,
            &signup.country,
            &signup.state,
            &signup.city,
            &signup.zipcode,
            &signup.mobile_number,
            &signup.create_account,
        ]
    }

    #[tokio::test]
    async fn test_fill_signup_form() {
        let driver = Arc::new(MockDriver::new());
        let page = fast_page(&driver);
        let signup = SignupPage::new(&page);
        for loc in form_fields(&signup) {
            driver.add_element("/signup", loc.selector().clone(), "");
        }
        let profile = UserProfile::with_email("ada@example.com");
        let (mrs, country, month) = (
            signup.title_mrs.selector().clone(),
            signup.country.selector().clone(),
            signup.months.selector().clone(),
        );
        driver.on_click(signup.create_account.selector().clone(), move |s| {
            assert!(s.is_checked(&mrs));
            assert_eq!(s.value_of(&country), Some("Canada"));
            assert_eq!(s.value_of(&month), Some("12"));
            s.go("/account_created");
        });

        page.goto("/signup").await.unwrap();
        signup.verify_account_info_visible().await.unwrap();
        signup.fill_signup_form(&profile).await.unwrap();
        signup.click_create_account().await.unwrap();
        assert!(driver.was_called("check:css=#newsletter=true"));
        assert!(driver.was_called("fill:css=[data-qa=\"mobile_number\"]=+1 416 555 0199"));
    }

    #[tokio::test]
    async fn test_opt_ins_skipped_when_false() {
        let driver = Arc::new(MockDriver::new());
        let page = fast_page(&driver);
        let signup = SignupPage::new(&page);
        for loc in form_fields(&signup) {
            driver.add_element("/signup", loc.selector().clone(), "");
        }
        let mut profile = UserProfile::with_email("ada@example.com");
        profile.newsletter = false;
        profile.special_offers = false;
        profile.title = Title::Mr;

        page.goto("/signup").await.unwrap();
        signup.fill_signup_form(&profile).await.unwrap();
        assert!(!driver.was_called("check:css=#newsletter"));
        assert!(!driver.was_called("check:css=#optin"));
        assert!(driver.was_called("check:css=#id_gender1=true"));
    }
}

//! Test data: fixture profiles, cards, messages and catalog facts.
//!
//! Everything here is plain data. The only non-deterministic value is the
//! email address of a fresh profile, which must be unique per run because
//! the storefront keeps accounts between runs.

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Salutation radio on the account-information form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Title {
    /// `Mr.`
    Mr,
    /// `Mrs.`
    Mrs,
}

impl Title {
    /// Value sent to the API
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mr => "Mr",
            Self::Mrs => "Mrs",
        }
    }
}

/// Date of birth as the signup dropdowns take it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDate {
    /// Day of month, 1-31
    pub day: u8,
    /// Month, 1-12
    pub month: u8,
    /// Four digit year
    pub year: u16,
}

impl BirthDate {
    /// English month name, as shown in the months dropdown and API payload
    #[must_use]
    pub fn month_name(&self) -> &'static str {
        const MONTHS: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        MONTHS
            .get(usize::from(self.month).saturating_sub(1))
            .copied()
            .unwrap_or("January")
    }
}

/// Delivery/billing address block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address1: String,
    pub address2: String,
    /// One of the storefront's country options
    pub country: String,
    pub state: String,
    pub city: String,
    pub zipcode: String,
    pub mobile_number: String,
}

/// A storefront customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name shown in "Logged in as"
    pub name: String,
    pub email: String,
    pub password: String,
    pub title: Title,
    pub birth_date: BirthDate,
    pub newsletter: bool,
    pub special_offers: bool,
    pub address: Address,
}

impl UserProfile {
    /// The standard fixture customer with a fresh, unique email
    #[must_use]
    pub fn fresh() -> Self {
        Self::with_email(unique_email("shopcheck", "example.com"))
    }

    /// The standard fixture customer with a given email
    #[must_use]
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            name: "Ada Tester".to_string(),
            email: email.into(),
            password: "S3cure!pass".to_string(),
            title: Title::Mrs,
            birth_date: BirthDate {
                day: 10,
                month: 12,
                year: 1990,
            },
            newsletter: true,
            special_offers: true,
            address: Address {
                first_name: "Ada".to_string(),
                last_name: "Tester".to_string(),
                company: "Analytical Engines Ltd".to_string(),
                address1: "12 Babbage Street".to_string(),
                address2: "Suite 4".to_string(),
                country: "Canada".to_string(),
                state: "Ontario".to_string(),
                city: "Toronto".to_string(),
                zipcode: "M5V 2T6".to_string(),
                mobile_number: "+1 416 555 0199".to_string(),
            },
        }
    }

    /// Form fields accepted by `createAccount`/`updateAccount`
    #[must_use]
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        let a = &self.address;
        vec![
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("password", self.password.clone()),
            ("title", self.title.as_str().to_string()),
            ("birth_date", self.birth_date.day.to_string()),
            ("birth_month", self.birth_date.month_name().to_string()),
            ("birth_year", self.birth_date.year.to_string()),
            ("firstname", a.first_name.clone()),
            ("lastname", a.last_name.clone()),
            ("company", a.company.clone()),
            ("address1", a.address1.clone()),
            ("address2", a.address2.clone()),
            ("country", a.country.clone()),
            ("zipcode", a.zipcode.clone()),
            ("state", a.state.clone()),
            ("city", a.city.clone()),
            ("mobile_number", a.mobile_number.clone()),
        ]
    }
}

/// Email/password pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    pub email: &'static str,
    pub password: &'static str,
}

/// Account that scenarios expect to exist (created on first use)
pub const DEMO_ACCOUNT: Credentials = Credentials {
    email: "shopcheck.demo@example.com",
    password: "S3cure!pass",
};

/// Credentials that must never log in
pub const INVALID_CREDENTIALS: Credentials = Credentials {
    email: "nobody.here@example.invalid",
    password: "definitely-wrong",
};

/// Payment card for checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCard {
    pub name_on_card: String,
    pub number: String,
    pub cvc: String,
    pub expiry_month: String,
    pub expiry_year: String,
}

impl PaymentCard {
    /// Test card accepted by the demo checkout
    #[must_use]
    pub fn test_card() -> Self {
        Self {
            name_on_card: "Ada Tester".to_string(),
            number: "4111111111111111".to_string(),
            cvc: "123".to_string(),
            expiry_month: "12".to_string(),
            expiry_year: "2030".to_string(),
        }
    }
}

/// Contact-us form input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// File attached through the upload input
    pub attachment: Option<PathBuf>,
}

impl ContactMessage {
    /// A complete, valid message without an attachment
    #[must_use]
    pub fn valid() -> Self {
        Self {
            name: "Ada Tester".to_string(),
            email: "ada.tester@example.com".to_string(),
            subject: "Order enquiry".to_string(),
            message: "Hello, I would like to know when my order ships.".to_string(),
            attachment: None,
        }
    }

    /// A message missing the required email field
    #[must_use]
    pub fn missing_email() -> Self {
        Self {
            email: String::new(),
            ..Self::valid()
        }
    }

    /// Attach a file
    #[must_use]
    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment = Some(path.into());
        self
    }
}

/// A catalog product the scenarios rely on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub id: u32,
    pub name: &'static str,
    /// Price in rupees
    pub price: u32,
}

/// Stable products of the demo catalog
pub const CATALOG: [Product; 4] = [
    Product {
        id: 1,
        name: "Blue Top",
        price: 500,
    },
    Product {
        id: 2,
        name: "Men Tshirt",
        price: 400,
    },
    Product {
        id: 3,
        name: "Sleeveless Dress",
        price: 1000,
    },
    Product {
        id: 4,
        name: "Stylish Dress",
        price: 1500,
    },
];

/// Search term with several matches in the catalog
pub const SEARCH_TERM: &str = "Dress";

/// `local+<unix-millis>-<uuid prefix>@domain`
#[must_use]
pub fn unique_email(local: &str, domain: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let uuid = Uuid::new_v4().simple().to_string();
    let suffix = &uuid[..8];
    format!("{local}+{millis}-{suffix}@{domain}")
}

/// Parse a displayed price such as `Rs. 1500` into rupees
#[must_use]
pub fn parse_price(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

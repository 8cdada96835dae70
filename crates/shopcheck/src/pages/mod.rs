//! Page objects for the Automation Exercise storefront.
//!
//! One struct per page. Each is built from a [`crate::Page`] handle, owns
//! its locators and exposes actions (`login`, `fill_signup_form`) and
//! assertions (`verify_*`). Assertions wait up to the page's action timeout.

mod account;
mod cart;
mod checkout;
mod contact;
mod header;
mod home;
mod login;
mod payment;
mod product_detail;
mod products;
mod signup;

pub use account::AccountStatusPage;
pub use cart::{cart_total, CartLine, CartPage};
pub use checkout::CheckoutPage;
pub use contact::{ContactPage, CONTACT_SUCCESS};
pub use header::Header;
pub use home::HomePage;
pub use login::{LoginPage, EMAIL_EXISTS_ERROR, LOGIN_ERROR};
pub use payment::PaymentPage;
pub use product_detail::ProductDetailPage;
pub use products::ProductsPage;
pub use signup::SignupPage;

/// Outcome of submitting the "New User Signup!" form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupStart {
    /// Account-information form shown; the email is new
    AccountInfo,
    /// "Email Address already exist!" shown
    EmailExists,
}

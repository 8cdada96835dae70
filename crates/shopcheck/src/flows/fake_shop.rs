//! Scripted storefront for offline flow tests.
//!
//! A [`MockDriver`] wired with click reactions that behave like the real
//! site closely enough for every flow: signup, login, cart, checkout,
//! payment and the contact form. Registered accounts live in the same
//! table the fake API serves, so API cross-checks agree with the UI.
//!
//! Session state sits in [`MockState::store`]: `session` holds the
//! logged-in email, `pending_name`/`pending_email` carry the signup form
//! over to `/signup`, and `cart` is `id:qty` pairs joined by commas.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::fake::{self, Accounts};
use crate::api::ApiClient;
use crate::data::{Product, UserProfile, CATALOG};
use crate::driver::{MockDriver, MockElement, MockState, EVERY_PAGE};
use crate::locator::{Locator, Selector};
use crate::page::Page;
use crate::pages::testing::fast_page;
use crate::pages::{
    AccountStatusPage, CartPage, CheckoutPage, ContactPage, Header, HomePage, LoginPage,
    PaymentPage, ProductDetailPage, ProductsPage, SignupPage, CONTACT_SUCCESS,
    EMAIL_EXISTS_ERROR, LOGIN_ERROR,
};
use crate::reporter::TraceData;
use crate::scenario::ScenarioContext;

pub(crate) use crate::pages::testing::BASE;

/// Locators of every page, built over a throwaway page
struct Site {
    header: Header,
    home: HomePage,
    login: LoginPage,
    signup: SignupPage,
    status: AccountStatusPage,
    products: ProductsPage,
    detail: ProductDetailPage,
    cart: CartPage,
    checkout: CheckoutPage,
    payment: PaymentPage,
    contact: ContactPage,
}

impl Site {
    fn new() -> Self {
        let page = Page::new(Arc::new(MockDriver::new()), BASE);
        Self {
            header: Header::new(&page),
            home: HomePage::new(&page),
            login: LoginPage::new(&page),
            signup: SignupPage::new(&page),
            status: AccountStatusPage::new(&page),
            products: ProductsPage::new(&page),
            detail: ProductDetailPage::new(&page, 0),
            cart: CartPage::new(&page),
            checkout: CheckoutPage::new(&page),
            payment: PaymentPage::new(&page),
            contact: ContactPage::new(&page),
        }
    }

    fn modal(&self) -> [&Locator; 3] {
        [
            &self.products.added_modal,
            &self.products.continue_shopping,
            &self.products.modal_view_cart,
        ]
    }
}

fn sel(locator: &Locator) -> Selector {
    locator.selector().clone()
}

fn value(s: &MockState, locator: &Locator) -> String {
    s.value_of(locator.selector()).unwrap_or_default().to_string()
}

/// Replace every element matching `locator` on `path` with one showing `text`
fn put(s: &mut MockState, path: &str, locator: &Locator, text: &str) {
    s.remove(path, locator.selector());
    s.show(path, MockElement::new(sel(locator), text));
}

fn product(id: u32) -> Option<Product> {
    CATALOG.iter().copied().find(|p| p.id == id)
}

fn cart(s: &MockState) -> Vec<(u32, u32)> {
    s.store
        .get("cart")
        .map(|c| {
            c.split(',')
                .filter_map(|pair| {
                    let (id, qty) = pair.split_once(':')?;
                    Some((id.parse().ok()?, qty.parse().ok()?))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn set_cart(site: &Site, s: &mut MockState, lines: &[(u32, u32)]) {
    let encoded: Vec<String> = lines.iter().map(|(id, qty)| format!("{id}:{qty}")).collect();
    let _ = s.store.insert("cart".to_string(), encoded.join(","));
    render_cart(site, s, lines);
}

fn render_cart(site: &Site, s: &mut MockState, lines: &[(u32, u32)]) {
    const PATH: &str = "/view_cart";
    let c = &site.cart;
    for locator in [&c.row_names, &c.row_prices, &c.row_quantities, &c.row_totals, &c.empty_cart] {
        s.remove(PATH, locator.selector());
    }
    for p in &CATALOG {
        s.remove(PATH, CartPage::remove_link(p.id).selector());
    }
    if lines.is_empty() {
        s.show(
            PATH,
            MockElement::new(sel(&c.empty_cart), "Cart is empty! Click here to buy products."),
        );
    }
    for &(id, qty) in lines {
        let Some(p) = product(id) else { continue };
        s.show(PATH, MockElement::new(sel(&c.row_names), p.name));
        s.show(PATH, MockElement::new(sel(&c.row_prices), format!("Rs. {}", p.price)));
        s.show(PATH, MockElement::new(sel(&c.row_quantities), qty.to_string()));
        s.show(PATH, MockElement::new(sel(&c.row_totals), format!("Rs. {}", p.price * qty)));
        s.show(PATH, MockElement::new(CartPage::remove_link(id).selector().clone(), ""));
    }
}

fn render_listing(site: &Site, s: &mut MockState, term: Option<&str>) {
    const PATH: &str = "/products";
    let p = &site.products;
    s.remove(PATH, p.product_cards.selector());
    s.remove(PATH, p.product_names.selector());
    let needle = term.map(str::to_lowercase);
    for item in &CATALOG {
        s.remove(PATH, ProductsPage::add_to_cart_button(item.id).selector());
        s.remove(PATH, ProductsPage::view_product_link(item.id).selector());
        if needle
            .as_deref()
            .is_some_and(|n| !item.name.to_lowercase().contains(n))
        {
            continue;
        }
        s.show(PATH, MockElement::new(sel(&p.product_cards), ""));
        s.show(PATH, MockElement::new(sel(&p.product_names), item.name));
        s.show(
            PATH,
            MockElement::new(sel(&ProductsPage::add_to_cart_button(item.id)), "Add to cart"),
        );
        s.show(
            PATH,
            MockElement::new(sel(&ProductsPage::view_product_link(item.id)), "View Product"),
        );
    }
}

fn sign_in(site: &Site, s: &mut MockState, email: &str, name: &str) {
    let h = &site.header;
    s.remove(EVERY_PAGE, h.signup_login.selector());
    put(s, EVERY_PAGE, &h.logout, "Logout");
    put(s, EVERY_PAGE, &h.delete_account, "Delete Account");
    put(s, EVERY_PAGE, &h.logged_in_as, &format!("Logged in as {name}"));
    let _ = s.store.insert("session".to_string(), email.to_string());
}

fn sign_out(site: &Site, s: &mut MockState) {
    let h = &site.header;
    for locator in [&h.logout, &h.delete_account, &h.logged_in_as] {
        s.remove(EVERY_PAGE, locator.selector());
    }
    put(s, EVERY_PAGE, &h.signup_login, "Signup / Login");
    let _ = s.store.remove("session");
}

fn session_account(accounts: &Accounts, s: &MockState) -> Option<HashMap<String, String>> {
    let email = s.store.get("session")?;
    accounts.lock().unwrap().get(email).cloned()
}

fn add_to_cart(site: &Site, s: &mut MockState, id: u32, quantity: u32) {
    let mut lines = cart(s);
    match lines.iter().position(|(line_id, _)| *line_id == id) {
        Some(i) => lines[i].1 += quantity,
        None => lines.push((id, quantity)),
    }
    set_cart(site, s, &lines);
    let path = s.path();
    put(s, &path, &site.products.added_modal, "Added! Your product has been added to cart.");
    put(s, &path, &site.products.continue_shopping, "Continue Shopping");
    put(s, &path, &site.products.modal_view_cart, "View Cart");
}

fn close_modal(site: &Site, s: &mut MockState) {
    let path = s.path();
    for locator in site.modal() {
        s.remove(&path, locator.selector());
    }
}

fn log_in(site: &Site, accounts: &Accounts, s: &mut MockState) {
    let email = value(s, &site.login.login_email);
    let password = value(s, &site.login.login_password);
    if email.is_empty() || password.is_empty() {
        return;
    }
    let name = accounts
        .lock()
        .unwrap()
        .get(&email)
        .filter(|a| a.get("password") == Some(&password))
        .and_then(|a| a.get("name").cloned());
    s.remove("/login", site.login.login_error.selector());
    match name {
        Some(name) => {
            sign_in(site, s, &email, &name);
            s.go("/");
        }
        None => s.show("/login", MockElement::new(sel(&site.login.login_error), LOGIN_ERROR)),
    }
}

fn start_signup(site: &Site, accounts: &Accounts, s: &mut MockState) {
    let name = value(s, &site.login.signup_name);
    let email = value(s, &site.login.signup_email);
    if name.is_empty() || email.is_empty() {
        return;
    }
    s.remove("/login", site.login.signup_error.selector());
    if accounts.lock().unwrap().contains_key(&email) {
        s.show(
            "/login",
            MockElement::new(sel(&site.login.signup_error), EMAIL_EXISTS_ERROR),
        );
        return;
    }
    let _ = s.store.insert("pending_name".to_string(), name);
    let _ = s.store.insert("pending_email".to_string(), email);
    s.go("/signup");
}

fn create_account(site: &Site, accounts: &Accounts, s: &mut MockState) {
    let f = &site.signup;
    let title = if s.is_checked(f.title_mr.selector()) { "Mr" } else { "Mrs" };
    let pending = |key: &str| s.store.get(key).cloned().unwrap_or_default();
    let form: HashMap<String, String> = [
        ("name", pending("pending_name")),
        ("email", pending("pending_email")),
        ("title", title.to_string()),
        ("password", value(s, &f.password)),
        ("birth_date", value(s, &f.days)),
        ("birth_month", value(s, &f.months)),
        ("birth_year", value(s, &f.years)),
        ("firstname", value(s, &f.first_name)),
        ("lastname", value(s, &f.last_name)),
        ("company", value(s, &f.company)),
        ("address1", value(s, &f.address1)),
        ("address2", value(s, &f.address2)),
        ("country", value(s, &f.country)),
        ("state", value(s, &f.state)),
        ("city", value(s, &f.city)),
        ("zipcode", value(s, &f.zipcode)),
        ("mobile_number", value(s, &f.mobile_number)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let required = [
        "email", "password", "firstname", "lastname", "address1", "state", "city", "zipcode",
        "mobile_number",
    ];
    if required.iter().any(|k| form[*k].is_empty()) {
        return;
    }
    let email = form["email"].clone();
    let name = form["name"].clone();
    let _ = accounts.lock().unwrap().insert(email.clone(), form);
    sign_in(site, s, &email, &name);
    s.go("/account_created");
}

fn delete_account(site: &Site, accounts: &Accounts, s: &mut MockState) {
    if let Some(email) = s.store.get("session") {
        let _ = accounts.lock().unwrap().remove(email);
    }
    sign_out(site, s);
    s.go("/delete_account");
}

fn proceed_to_checkout(site: &Site, accounts: &Accounts, s: &mut MockState) {
    const PATH: &str = "/checkout";
    let Some(account) = session_account(accounts, s) else {
        put(s, "/view_cart", &site.cart.checkout_modal_login, "Register / Login");
        return;
    };
    let field = |k: &str| account.get(k).cloned().unwrap_or_default();
    let address = format!(
        "{}. {} {} {} {} {} {} {} {} {} {}",
        field("title"),
        field("firstname"),
        field("lastname"),
        field("company"),
        field("address1"),
        field("address2"),
        field("city"),
        field("state"),
        field("zipcode"),
        field("country"),
        field("mobile_number"),
    );
    put(s, PATH, &site.checkout.delivery_address, &address);
    put(s, PATH, &site.checkout.invoice_address, &address);
    s.remove(PATH, site.checkout.order_rows.selector());
    for (id, qty) in cart(s) {
        if let Some(p) = product(id) {
            let row = format!("{} Rs. {} {qty} Rs. {}", p.name, p.price, p.price * qty);
            s.show(PATH, MockElement::new(sel(&site.checkout.order_rows), row));
        }
    }
    s.go(PATH);
}

fn pay(site: &Site, s: &mut MockState) {
    let p = &site.payment;
    let card = [&p.name_on_card, &p.card_number, &p.cvc, &p.expiry_month, &p.expiry_year];
    if card.iter().any(|l| value(s, l).is_empty()) {
        return;
    }
    let total: u32 = cart(s)
        .iter()
        .filter_map(|&(id, qty)| product(id).map(|item| item.price * qty))
        .sum();
    set_cart(site, s, &[]);
    let path = format!("/payment_done/{total}");
    put(s, &path, &p.order_placed, "Order Placed!");
    put(s, &path, &p.confirmation, "Congratulations! Your order has been confirmed!");
    s.go(&path);
}

fn submit_contact(site: &Site, s: &mut MockState) {
    let c = &site.contact;
    let filled = [&c.name, &c.email, &c.message]
        .iter()
        .all(|l| !value(s, l).is_empty());
    if !filled || !s.dialogs_accepted() {
        return;
    }
    put(s, "/contact_us", &c.success, CONTACT_SUCCESS);
    put(s, "/contact_us", &c.home_button, "Home");
}

fn subscribe(site: &Site, s: &mut MockState) {
    if value(s, &site.home.subscribe_email).is_empty() {
        return;
    }
    put(
        s,
        "/",
        &site.home.subscribe_success,
        "You have been successfully subscribed!",
    );
}

/// Static page content, before any click
fn render_static(site: &Site, driver: &MockDriver) {
    let h = &site.header;
    for (locator, text) in [
        (&h.home, "Home"),
        (&h.products, "Products"),
        (&h.cart, "Cart"),
        (&h.signup_login, "Signup / Login"),
        (&h.contact_us, "Contact us"),
    ] {
        driver.add_element(EVERY_PAGE, sel(locator), text);
    }

    let home = &site.home;
    driver.add_element("/", sel(&home.slider), "");
    driver.add_element("/", sel(&home.subscription_heading), "Subscription");
    driver.add_element("/", sel(&home.subscribe_email), "");
    driver.add_element("/", sel(&home.subscribe_button), "");

    let l = &site.login;
    driver.add_element("/login", sel(&l.login_heading), "Login to your account");
    driver.add_element("/login", sel(&l.signup_heading), "New User Signup!");
    for locator in [
        &l.login_email,
        &l.login_password,
        &l.login_button,
        &l.signup_name,
        &l.signup_email,
        &l.signup_button,
    ] {
        driver.add_element("/login", sel(locator), "");
    }

    let f = &site.signup;
    driver.add_element("/signup", sel(&f.heading), "Enter Account Information");
    for locator in [
        &f.title_mr,
        &f.title_mrs,
        &f.password,
        &f.days,
        &f.months,
        &f.years,
        &f.newsletter,
        &f.special_offers,
        &f.first_name,
        &f.last_name,
        &f.company,
        &f.address1,
        &f.address2,
        &f.country,
        &f.state,
        &f.city,
        &f.zipcode,
        &f.mobile_number,
        &f.create_account,
    ] {
        driver.add_element("/signup", sel(locator), "");
    }

    let st = &site.status;
    driver.add_element("/account_created", sel(&st.created), "Account Created!");
    driver.add_element("/delete_account", sel(&st.deleted), "Account Deleted!");
    for path in ["/account_created", "/delete_account"] {
        driver.add_element(path, sel(&st.continue_button), "Continue");
    }

    let p = &site.products;
    driver.add_element("/products", sel(&p.heading), "All Products");
    driver.add_element("/products", sel(&p.search_input), "");
    driver.add_element("/products", sel(&p.search_button), "");

    let d = &site.detail;
    for item in &CATALOG {
        let path = format!("/product_details/{}", item.id);
        driver.add_element(&path, sel(&d.name), item.name);
        driver.add_element(&path, sel(&d.category), "Category: Women > Tops");
        driver.add_element(&path, sel(&d.price), format!("Rs. {}", item.price));
        driver.add_element(&path, sel(&d.availability), "Availability: In Stock");
        driver.add_element(&path, sel(&d.quantity), "");
        driver.add_element(&path, sel(&d.add_to_cart), "Add to cart");
    }

    driver.add_element("/view_cart", sel(&site.cart.table), "");
    driver.add_element("/view_cart", sel(&site.cart.proceed_to_checkout), "Proceed To Checkout");

    let co = &site.checkout;
    driver.add_element("/checkout", sel(&co.address_heading), "Address Details");
    driver.add_element("/checkout", sel(&co.review_heading), "Review Your Order");
    driver.add_element("/checkout", sel(&co.comment), "");
    driver.add_element("/checkout", sel(&co.place_order), "Place Order");

    let pay = &site.payment;
    for locator in [
        &pay.name_on_card,
        &pay.card_number,
        &pay.cvc,
        &pay.expiry_month,
        &pay.expiry_year,
        &pay.pay_button,
    ] {
        driver.add_element("/payment", sel(locator), "");
    }

    let c = &site.contact;
    driver.add_element("/contact_us", sel(&c.heading), "Get In Touch");
    for locator in [&c.name, &c.email, &c.subject, &c.message, &c.upload, &c.submit] {
        driver.add_element("/contact_us", sel(locator), "");
    }
}

type Handler = fn(&Site, &Accounts, &mut MockState);

fn wire(driver: &MockDriver, site: &Arc<Site>, accounts: &Accounts, locator: &Locator, handler: Handler) {
    let site = Arc::clone(site);
    let accounts = accounts.clone();
    driver.on_click(sel(locator), move |s| handler(&site, &accounts, s));
}

/// Build a fresh browser page onto the scripted storefront
pub(crate) fn storefront(accounts: &Accounts) -> Arc<MockDriver> {
    let driver = Arc::new(MockDriver::new());
    let site = Arc::new(Site::new());
    render_static(&site, &driver);
    driver.with_state(|s| {
        render_listing(&site, s, None);
        render_cart(&site, s, &[]);
    });

    let h = &site.header;
    wire(&driver, &site, accounts, &h.home, |_, _, s| s.go("/"));
    wire(&driver, &site, accounts, &h.products, |_, _, s| s.go("/products"));
    wire(&driver, &site, accounts, &h.cart, |_, _, s| s.go("/view_cart"));
    wire(&driver, &site, accounts, &h.signup_login, |_, _, s| s.go("/login"));
    wire(&driver, &site, accounts, &h.contact_us, |_, _, s| s.go("/contact_us"));
    wire(&driver, &site, accounts, &h.logout, |site, _, s| {
        sign_out(site, s);
        s.go("/login");
    });
    wire(&driver, &site, accounts, &h.delete_account, delete_account);

    wire(&driver, &site, accounts, &site.home.subscribe_button, |site, _, s| {
        subscribe(site, s);
    });
    wire(&driver, &site, accounts, &site.login.login_button, log_in);
    wire(&driver, &site, accounts, &site.login.signup_button, start_signup);
    wire(&driver, &site, accounts, &site.signup.create_account, create_account);
    wire(&driver, &site, accounts, &site.status.continue_button, |_, _, s| s.go("/"));

    wire(&driver, &site, accounts, &site.products.search_button, |site, _, s| {
        let term = value(s, &site.products.search_input);
        s.set_text("/products", site.products.heading.selector(), "Searched Products");
        render_listing(site, s, Some(&term));
    });
    wire(&driver, &site, accounts, &site.products.continue_shopping, |site, _, s| {
        close_modal(site, s);
    });
    wire(&driver, &site, accounts, &site.products.modal_view_cart, |site, _, s| {
        close_modal(site, s);
        s.go("/view_cart");
    });
    wire(&driver, &site, accounts, &site.detail.add_to_cart, |site, _, s| {
        let id = s.path().rsplit('/').next().and_then(|id| id.parse().ok());
        let quantity = value(s, &site.detail.quantity).parse().unwrap_or(1);
        if let Some(id) = id {
            add_to_cart(site, s, id, quantity);
        }
    });
    for item in &CATALOG {
        let id = item.id;
        let to_site = Arc::clone(&site);
        driver.on_click(sel(&ProductsPage::add_to_cart_button(id)), move |s| {
            add_to_cart(&to_site, s, id, 1);
        });
        let to_detail = format!("/product_details/{id}");
        driver.on_click(sel(&ProductsPage::view_product_link(id)), move |s| {
            s.go(&to_detail);
        });
        let from_cart = Arc::clone(&site);
        driver.on_click(sel(&CartPage::remove_link(id)), move |s| {
            let lines: Vec<(u32, u32)> = cart(s).into_iter().filter(|l| l.0 != id).collect();
            set_cart(&from_cart, s, &lines);
        });
    }

    wire(&driver, &site, accounts, &site.cart.proceed_to_checkout, proceed_to_checkout);
    wire(&driver, &site, accounts, &site.cart.checkout_modal_login, |site, _, s| {
        s.remove("/view_cart", site.cart.checkout_modal_login.selector());
        s.go("/login");
    });
    wire(&driver, &site, accounts, &site.checkout.place_order, |_, _, s| s.go("/payment"));
    wire(&driver, &site, accounts, &site.payment.pay_button, |site, _, s| pay(site, s));
    wire(&driver, &site, accounts, &site.contact.submit, |site, _, s| {
        submit_contact(site, s);
    });
    wire(&driver, &site, accounts, &site.contact.home_button, |_, _, s| s.go("/"));
    driver
}

/// Storefront page plus fake API over one account table
pub(crate) struct FakeShop {
    pub accounts: Accounts,
    addr: SocketAddr,
    driver: Arc<MockDriver>,
}

impl FakeShop {
    pub async fn start() -> Self {
        let accounts = Accounts::default();
        let addr = fake::spawn_with(accounts.clone()).await;
        let driver = storefront(&accounts);
        Self {
            accounts,
            addr,
            driver,
        }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Context over the shop's page, as the runner would build it
    pub fn context(&self) -> ScenarioContext {
        ScenarioContext::new(
            fast_page(&self.driver),
            ApiClient::new(&self.api_url()),
            TraceData::new("fake shop", 1),
        )
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.accounts.lock().unwrap().contains_key(email)
    }

    pub fn no_accounts(&self) -> bool {
        self.accounts.lock().unwrap().is_empty()
    }

    /// Register `profile` directly, as if created in an earlier run
    pub fn seed_account(&self, profile: &UserProfile) {
        let form = profile
            .to_form()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let _ = self
            .accounts
            .lock()
            .unwrap()
            .insert(profile.email.clone(), form);
    }

    pub fn driver_called(&self, prefix: &str) -> bool {
        self.driver.was_called(prefix)
    }

    /// Pay button stays put, as with a declined card
    pub fn decline_payments(&self) {
        self.driver.on_click(sel(&Site::new().payment.pay_button), |_| {});
    }

    /// "Delete Account" in the header stops responding
    pub fn break_account_deletion(&self) {
        self.driver.on_click(sel(&Site::new().header.delete_account), |_| {});
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;

    #[tokio::test]
    async fn test_cart_encoding_survives_rerender() {
        let site = Site::new();
        let driver = MockDriver::new();
        driver.navigate(&format!("{BASE}/view_cart")).await.unwrap();
        driver.with_state(|s| {
            set_cart(&site, s, &[(1, 2), (3, 1)]);
            assert_eq!(cart(s), [(1, 2), (3, 1)]);
        });
        let totals = driver.texts(site.cart.row_totals.selector()).await.unwrap();
        assert_eq!(totals, ["Rs. 1000", "Rs. 1000"]);
        assert_eq!(driver.count_visible(site.cart.empty_cart.selector()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_login_needs_a_known_account() {
        let shop = FakeShop::start().await;
        let ctx = shop.context();
        let login = ctx.login();
        crate::page_object::PageObject::open(&login).await.unwrap();
        login.login("nobody@example.com", "x").await.unwrap();
        login.verify_login_error().await.unwrap();
        assert!(!ctx.header().is_logged_in().await.unwrap());
    }
}

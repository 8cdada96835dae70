//! Raw HTTP calls to the storefront's `/api/*` endpoints.
//!
//! The API answers `200 OK` for everything and puts the logical status in
//! the body's `responseCode`. Bodies are JSON served as `text/html`, so they
//! are read as text and parsed with `serde_json`. Callers decide which
//! `responseCode` they expect via [`ApiResponse::expect_code`].

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::data::UserProfile;
use crate::result::{ShopError, ShopResult};

/// A product as the API lists it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiProduct {
    pub id: u32,
    pub name: String,
    /// Display price, e.g. `Rs. 500`
    pub price: String,
    #[serde(default)]
    pub brand: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiBrand {
    pub id: u32,
    pub brand: String,
}

/// Account details returned by `getUserDetailByEmail`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiUser {
    pub name: String,
    pub email: String,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address1: String,
    pub address2: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub zipcode: String,
}

/// Body common to every endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "responseCode")]
    pub response_code: u16,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub products: Vec<ApiProduct>,
    #[serde(default)]
    pub brands: Vec<ApiBrand>,
    #[serde(default)]
    pub user: Option<ApiUser>,
}

impl ApiResponse {
    /// Keep the response if its `responseCode` is `code`
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Api` naming the endpoint, code and message
    pub fn expect_code(self, endpoint: &str, code: u16) -> ShopResult<Self> {
        if self.response_code == code {
            Ok(self)
        } else {
            Err(ShopError::Api {
                endpoint: endpoint.to_string(),
                code: self.response_code,
                message: format!(
                    "{} (expected {code})",
                    self.message.as_deref().unwrap_or("no message")
                ),
            })
        }
    }
}

/// Client for the storefront API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client rooted at the site's base URL
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    async fn read(endpoint: &str, resp: reqwest::Response) -> ShopResult<ApiResponse> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(endpoint, %status, "non-success HTTP status");
        }
        let parsed: ApiResponse = serde_json::from_str(&body).map_err(|e| ShopError::Api {
            endpoint: endpoint.to_string(),
            code: status.as_u16(),
            message: format!("unparseable body: {e}"),
        })?;
        debug!(endpoint, code = parsed.response_code, "api response");
        Ok(parsed)
    }

    pub async fn products_list(&self) -> ShopResult<ApiResponse> {
        let endpoint = "/api/productsList";
        let resp = self.client.get(self.url(endpoint)).send().await?;
        Self::read(endpoint, resp).await
    }

    pub async fn brands_list(&self) -> ShopResult<ApiResponse> {
        let endpoint = "/api/brandsList";
        let resp = self.client.get(self.url(endpoint)).send().await?;
        Self::read(endpoint, resp).await
    }

    pub async fn search_product(&self, term: &str) -> ShopResult<ApiResponse> {
        let endpoint = "/api/searchProduct";
        let resp = self
            .client
            .post(self.url(endpoint))
            .form(&[("search_product", term)])
            .send()
            .await?;
        Self::read(endpoint, resp).await
    }

    pub async fn verify_login(&self, email: &str, password: &str) -> ShopResult<ApiResponse> {
        let endpoint = "/api/verifyLogin";
        let resp = self
            .client
            .post(self.url(endpoint))
            .form(&[("email", email), ("password", password)])
            .send()
            .await?;
        Self::read(endpoint, resp).await
    }

    pub async fn create_account(&self, profile: &UserProfile) -> ShopResult<ApiResponse> {
        let endpoint = "/api/createAccount";
        let resp = self
            .client
            .post(self.url(endpoint))
            .form(&profile.to_form())
            .send()
            .await?;
        Self::read(endpoint, resp).await
    }

    pub async fn update_account(&self, profile: &UserProfile) -> ShopResult<ApiResponse> {
        let endpoint = "/api/updateAccount";
        let resp = self
            .client
            .put(self.url(endpoint))
            .form(&profile.to_form())
            .send()
            .await?;
        Self::read(endpoint, resp).await
    }

    pub async fn delete_account(&self, email: &str, password: &str) -> ShopResult<ApiResponse> {
        let endpoint = "/api/deleteAccount";
        let resp = self
            .client
            .delete(self.url(endpoint))
            .form(&[("email", email), ("password", password)])
            .send()
            .await?;
        Self::read(endpoint, resp).await
    }

    pub async fn user_detail_by_email(&self, email: &str) -> ShopResult<ApiResponse> {
        let endpoint = "/api/getUserDetailByEmail";
        let resp = self
            .client
            .get(self.url(endpoint))
            .query(&[("email", email)])
            .send()
            .await?;
        Self::read(endpoint, resp).await
    }

    /// Whether the credentials log in (`verifyLogin` answers 200)
    pub async fn account_exists(&self, email: &str, password: &str) -> ShopResult<bool> {
        Ok(self.verify_login(email, password).await?.response_code == 200)
    }

    /// Delete the account if it exists; absent accounts are fine
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Api` for any code other than 200 or 404
    pub async fn ensure_deleted(&self, email: &str, password: &str) -> ShopResult<()> {
        let resp = self.delete_account(email, password).await?;
        match resp.response_code {
            200 | 404 => Ok(()),
            _ => resp.expect_code("/api/deleteAccount", 200).map(|_| ()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod fake {
    //! In-process stand-in for the storefront API

    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::header;
    use axum::response::IntoResponse;
    use axum::routing::{delete, get, post, put};
    use axum::{Form, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    /// Registered accounts by email; values are the submitted form fields
    pub type Accounts = Arc<Mutex<HashMap<String, HashMap<String, String>>>>;

    fn reply(body: Value) -> impl IntoResponse {
        ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], body.to_string())
    }

    fn products() -> Value {
        json!([
            {"id": 1, "name": "Blue Top", "price": "Rs. 500", "brand": "Polo",
             "category": {"usertype": {"usertype": "Women"}, "category": "Tops"}},
            {"id": 3, "name": "Sleeveless Dress", "price": "Rs. 1000", "brand": "Madame",
             "category": {"usertype": {"usertype": "Women"}, "category": "Dress"}}
        ])
    }

    async fn products_list() -> impl IntoResponse {
        reply(json!({"responseCode": 200, "products": products()}))
    }

    async fn brands_list() -> impl IntoResponse {
        reply(json!({"responseCode": 200, "brands": [{"id": 1, "brand": "Polo"}]}))
    }

    async fn search(Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
        match form.get("search_product") {
            Some(term) => {
                let term = term.to_lowercase();
                let hits: Vec<Value> = products()
                    .as_array()
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|p| p["name"].as_str().unwrap_or("").to_lowercase().contains(&term))
                    .collect();
                reply(json!({"responseCode": 200, "products": hits}))
            }
            None => reply(json!({"responseCode": 400,
                "message": "Bad request, search_product parameter is missing in POST request."})),
        }
    }

    fn credentials_match(accounts: &Accounts, form: &HashMap<String, String>) -> Option<bool> {
        let email = form.get("email")?;
        let password = form.get("password")?;
        let accounts = accounts.lock().unwrap();
        Some(
            accounts
                .get(email)
                .is_some_and(|a| a.get("password") == Some(password)),
        )
    }

    async fn verify_login(
        State(accounts): State<Accounts>,
        Form(form): Form<HashMap<String, String>>,
    ) -> impl IntoResponse {
        match credentials_match(&accounts, &form) {
            Some(true) => reply(json!({"responseCode": 200, "message": "User exists!"})),
            Some(false) => reply(json!({"responseCode": 404, "message": "User not found!"})),
            None => reply(json!({"responseCode": 400,
                "message": "Bad request, email or password parameter is missing in POST request."})),
        }
    }

    async fn create(
        State(accounts): State<Accounts>,
        Form(form): Form<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let email = form.get("email").cloned().unwrap_or_default();
        let mut accounts = accounts.lock().unwrap();
        if accounts.contains_key(&email) {
            return reply(json!({"responseCode": 400, "message": "Email already exists!"}));
        }
        let _ = accounts.insert(email, form);
        reply(json!({"responseCode": 201, "message": "User created!"}))
    }

    async fn update(
        State(accounts): State<Accounts>,
        Form(form): Form<HashMap<String, String>>,
    ) -> impl IntoResponse {
        if credentials_match(&accounts, &form) != Some(true) {
            return reply(json!({"responseCode": 404, "message": "Account not found!"}));
        }
        let email = form.get("email").cloned().unwrap_or_default();
        let _ = accounts.lock().unwrap().insert(email, form);
        reply(json!({"responseCode": 200, "message": "User updated!"}))
    }

    async fn remove(
        State(accounts): State<Accounts>,
        Form(form): Form<HashMap<String, String>>,
    ) -> impl IntoResponse {
        if credentials_match(&accounts, &form) != Some(true) {
            return reply(json!({"responseCode": 404, "message": "Account not found!"}));
        }
        let email = form.get("email").cloned().unwrap_or_default();
        let _ = accounts.lock().unwrap().remove(&email);
        reply(json!({"responseCode": 200, "message": "Account deleted!"}))
    }

    async fn detail(
        State(accounts): State<Accounts>,
        Query(query): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let email = query.get("email").cloned().unwrap_or_default();
        let accounts = accounts.lock().unwrap();
        match accounts.get(&email) {
            Some(a) => {
                let field = |k: &str| a.get(k).cloned().unwrap_or_default();
                reply(json!({"responseCode": 200, "user": {
                    "id": 7, "name": field("name"), "email": email, "title": field("title"),
                    "birth_day": field("birth_date"), "birth_month": field("birth_month"),
                    "birth_year": field("birth_year"), "first_name": field("firstname"),
                    "last_name": field("lastname"), "company": field("company"),
                    "address1": field("address1"), "address2": field("address2"),
                    "country": field("country"), "state": field("state"),
                    "city": field("city"), "zipcode": field("zipcode")
                }}))
            }
            None => reply(json!({"responseCode": 404,
                "message": "Account not found with this email, try another email!"})),
        }
    }

    /// Serve the fake API on an ephemeral port
    pub async fn spawn() -> SocketAddr {
        spawn_with(Accounts::default()).await
    }

    /// Serve the fake API over an account table shared with the caller
    pub async fn spawn_with(accounts: Accounts) -> SocketAddr {
        let app = Router::new()
            .route("/api/productsList", get(products_list))
            .route("/api/brandsList", get(brands_list))
            .route("/api/searchProduct", post(search))
            .route("/api/verifyLogin", post(verify_login))
            .route("/api/createAccount", post(create))
            .route("/api/updateAccount", put(update))
            .route("/api/deleteAccount", delete(remove))
            .route("/api/getUserDetailByEmail", get(detail))
            .with_state(accounts);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        addr
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn client() -> ApiClient {
        let addr = fake::spawn().await;
        ApiClient::new(&format!("http://{addr}/"))
    }

    mod catalog_tests {
        use super::*;

        #[tokio::test]
        async fn test_products_list_parses_text_html_body() {
            let api = client().await;
            let resp = api.products_list().await.unwrap();
            assert_eq!(resp.response_code, 200);
            assert_eq!(resp.products[0].name, "Blue Top");
            assert_eq!(resp.products[0].brand, "Polo");
        }

        #[tokio::test]
        async fn test_brands_and_search() {
            let api = client().await;
            assert_eq!(api.brands_list().await.unwrap().brands[0].brand, "Polo");
            let found = api.search_product("dress").await.unwrap();
            assert_eq!(found.products.len(), 1);
            assert_eq!(found.products[0].id, 3);
        }
    }

    mod account_tests {
        use super::*;

        #[tokio::test]
        async fn test_create_read_delete_round_trip() {
            let api = client().await;
            let profile = UserProfile::fresh();
            assert!(!api.account_exists(&profile.email, &profile.password).await.unwrap());

            api.create_account(&profile)
                .await
                .unwrap()
                .expect_code("/api/createAccount", 201)
                .unwrap();
            assert!(api.account_exists(&profile.email, &profile.password).await.unwrap());

            let user = api
                .user_detail_by_email(&profile.email)
                .await
                .unwrap()
                .user
                .unwrap();
            assert_eq!(user.name, profile.name);
            assert_eq!(user.city, profile.address.city);

            api.ensure_deleted(&profile.email, &profile.password).await.unwrap();
            assert!(!api.account_exists(&profile.email, &profile.password).await.unwrap());
            // deleting an absent account is not an error
            api.ensure_deleted(&profile.email, &profile.password).await.unwrap();
        }

        #[tokio::test]
        async fn test_update_account() {
            let api = client().await;
            let mut profile = UserProfile::fresh();
            let _ = api.create_account(&profile).await.unwrap();
            profile.address.city = "Ottawa".to_string();
            api.update_account(&profile)
                .await
                .unwrap()
                .expect_code("/api/updateAccount", 200)
                .unwrap();
            let user = api.user_detail_by_email(&profile.email).await.unwrap().user.unwrap();
            assert_eq!(user.city, "Ottawa");
        }

        #[tokio::test]
        async fn test_invalid_login_is_404() {
            let api = client().await;
            let err = api
                .verify_login("nobody@example.invalid", "x")
                .await
                .unwrap()
                .expect_code("/api/verifyLogin", 200)
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "API /api/verifyLogin returned responseCode 404: User not found! (expected 200)"
            );
        }

        #[tokio::test]
        async fn test_duplicate_create_is_400() {
            let api = client().await;
            let profile = UserProfile::fresh();
            let _ = api.create_account(&profile).await.unwrap();
            let again = api.create_account(&profile).await.unwrap();
            assert_eq!(again.response_code, 400);
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_http_error() {
        let api = ApiClient::new("http://127.0.0.1:1");
        assert!(matches!(
            api.products_list().await,
            Err(ShopError::Http(_))
        ));
    }
}

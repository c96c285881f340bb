//! REST API client for the shop backend.
//!
//! Every request goes through [`ApiClient::request`], which reads the bearer
//! token from storage at send time and attaches `Authorization: Bearer ...`
//! when one is present. A missing token is not an error; the header is simply
//! omitted and the backend decides.
//!
//! ERROR HANDLING
//! ==============
//! Single attempt, no retry, no timeout policy, no caching. Transport failures
//! surface as [`ApiError::Request`], non-2xx responses as [`ApiError::Status`]
//! with the raw body preserved so callers can show the backend's `detail`.

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    ApiError, Credentials, DeleteResponse, Product, ProductCreate, ProductType, ProductUpdate, Review, ReviewCreate,
    Token, User,
};
use crate::config::ClientConfig;
use crate::state::cart::CartManager;
use crate::state::session::Session;
use crate::storage::SharedStorage;

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}

fn product_path(id: i64) -> String {
    format!("/products/{id}")
}

fn product_type_path(id: i64) -> String {
    format!("/product_types/{id}")
}

fn review_path(id: i64) -> String {
    format!("/reviews/{id}")
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(ApiError::Decode)
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client bound to one backend and one storage.
///
/// The cart and session handed out by [`ApiClient::cart`] and
/// [`ApiClient::session`] share that storage, so a token stored by
/// `session().store(..)` is picked up by the very next request.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: SharedStorage,
}

impl ApiClient {
    /// Build a client for `config.api_url` backed by `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, storage: SharedStorage) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.api_url.clone(), storage })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Cart manager operating on the `cart` key of this client's storage.
    #[must_use]
    pub fn cart(&self) -> CartManager {
        CartManager::new(self.storage.clone())
    }

    /// Token/user records in this client's storage.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(self.storage.clone())
    }

    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    #[must_use]
    pub fn products(&self) -> ProductsApi<'_> {
        ProductsApi { client: self }
    }

    #[must_use]
    pub fn product_types(&self) -> ProductTypesApi<'_> {
        ProductTypesApi { client: self }
    }

    #[must_use]
    pub fn reviews(&self) -> ReviewsApi<'_> {
        ReviewsApi { client: self }
    }

    fn authorization(&self) -> Result<Option<HeaderValue>, ApiError> {
        let Some(token) = self.session().token()? else {
            return Ok(None);
        };
        let mut value = HeaderValue::from_str(&bearer_header(&token)).map_err(|_| ApiError::InvalidToken)?;
        value.set_sensitive(true);
        Ok(Some(value))
    }

    /// Start a request to `path`, with the bearer token attached when stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be read or is not a valid header value.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let request = self.http.request(method, endpoint_url(&self.base_url, path));
        Ok(match self.authorization()? {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: &Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        tracing::debug!(%method, path, "api request");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::debug!(%method, path, status = status.as_u16(), "api request rejected");
            return Err(ApiError::Status { status: status.as_u16(), body: text });
        }
        parse_body(&text)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path)?;
        self.execute(&Method::GET, path, request).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method.clone(), path)?.json(body);
        self.execute(&method, path, request).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::DELETE, path)?;
        self.execute(&Method::DELETE, path, request).await
    }
}

// =============================================================================
// RESOURCES
// =============================================================================

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl AuthApi<'_> {
    /// `POST /auth/register`
    ///
    /// # Errors
    ///
    /// Transport, status (e.g. 400 login taken), or decode failure.
    pub async fn register(&self, login: &str, password: &str) -> Result<Token, ApiError> {
        let body = Credentials { login: login.to_owned(), password: password.to_owned() };
        self.client.send_json(Method::POST, "/auth/register", &body).await
    }

    /// `POST /auth/login`
    ///
    /// # Errors
    ///
    /// Transport, status (401 on bad credentials), or decode failure.
    pub async fn login(&self, login: &str, password: &str) -> Result<Token, ApiError> {
        let body = Credentials { login: login.to_owned(), password: password.to_owned() };
        self.client.send_json(Method::POST, "/auth/login", &body).await
    }

    /// `GET /users/me`
    ///
    /// # Errors
    ///
    /// Transport, status (401 without a valid token), or decode failure.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.client.get("/users/me").await
    }
}

pub struct ProductsApi<'a> {
    client: &'a ApiClient,
}

#[allow(clippy::missing_errors_doc)]
impl ProductsApi<'_> {
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.client.get("/products/").await
    }

    pub async fn get(&self, id: i64) -> Result<Product, ApiError> {
        self.client.get(&product_path(id)).await
    }

    pub async fn create(&self, product: &ProductCreate) -> Result<Product, ApiError> {
        self.client.send_json(Method::POST, "/products/", product).await
    }

    pub async fn update(&self, id: i64, update: &ProductUpdate) -> Result<Product, ApiError> {
        self.client.send_json(Method::PUT, &product_path(id), update).await
    }

    pub async fn delete(&self, id: i64) -> Result<DeleteResponse, ApiError> {
        self.client.delete(&product_path(id)).await
    }
}

pub struct ProductTypesApi<'a> {
    client: &'a ApiClient,
}

#[allow(clippy::missing_errors_doc)]
impl ProductTypesApi<'_> {
    pub async fn list(&self) -> Result<Vec<ProductType>, ApiError> {
        self.client.get("/product_types/").await
    }

    pub async fn get(&self, id: i64) -> Result<ProductType, ApiError> {
        self.client.get(&product_type_path(id)).await
    }
}

pub struct ReviewsApi<'a> {
    client: &'a ApiClient,
}

#[allow(clippy::missing_errors_doc)]
impl ReviewsApi<'_> {
    pub async fn list(&self) -> Result<Vec<Review>, ApiError> {
        self.client.get("/reviews/").await
    }

    /// The newest reviews, as shown in the landing-page slider.
    pub async fn latest(&self) -> Result<Vec<Review>, ApiError> {
        self.client.get("/reviews/latest").await
    }

    pub async fn get(&self, id: i64) -> Result<Review, ApiError> {
        self.client.get(&review_path(id)).await
    }

    pub async fn create(&self, review: &ReviewCreate) -> Result<Review, ApiError> {
        self.client.send_json(Method::POST, "/reviews/", review).await
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

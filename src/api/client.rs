//! HTTP API Client
//!
//! Functions for communicating with the Laptop Store REST API.

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::api::dto::{
    Laptop, LaptopFilter, LaptopPayload, LoginCredentials, Paginated, RegisterPayload,
    TokenResponse, User,
};
use crate::api::error::{ApiError, ApiResult};
use crate::config::ApiConfig;
use crate::session::TokenStore;

/// Whether a request carries the session's bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    None,
    Required,
}

/// A decoded 2xx response
struct Reply<T> {
    status: StatusCode,
    body: Option<T>,
}

/// Laptop Store REST API client
#[derive(Clone)]
pub struct StoreClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl StoreClient {
    /// Create a client for the configured backend.
    ///
    /// The token store is read on every authenticated call, so a login
    /// through any holder of the same store is picked up immediately.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::network(&config.base_url, e))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token store shared with the session holder
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    // ============ Auth ============

    /// Exchange credentials for a bearer token
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<TokenResponse> {
        let path = "/auth/login";
        let reply = self
            .send_json(Method::POST, path, credentials, Auth::None)
            .await?;
        require_body(reply, path)
    }

    /// Create an account. Returns the created user when the backend echoes one.
    pub async fn register(&self, payload: &RegisterPayload) -> ApiResult<Option<User>> {
        let created: Option<serde_json::Value> = self
            .request_json(Method::POST, "/auth/register", payload, Auth::None)
            .await?;
        Ok(created.and_then(|value| serde_json::from_value(value).ok()))
    }

    /// The user owning the stored token
    pub async fn current_user(&self) -> ApiResult<User> {
        let path = "/auth/me";
        let reply = self.send(Method::GET, path, Auth::Required).await?;
        require_body(reply, path)
    }

    // ============ Laptops ============

    /// Fetch a page of laptops matching the filter
    pub async fn list_laptops(&self, filter: &LaptopFilter) -> ApiResult<Paginated<Laptop>> {
        let path = "/laptops";
        let builder = self
            .builder(Method::GET, path, Auth::None)
            .query(&filter.query_pairs());
        let reply = self.execute(builder, Method::GET, path).await?;
        require_body(reply, path)
    }

    pub async fn get_laptop(&self, id: &str) -> ApiResult<Laptop> {
        let path = laptop_path(id);
        let reply = self.send(Method::GET, &path, Auth::None).await?;
        require_body(reply, &path)
    }

    /// Create a laptop (admin). Returns the stored laptop when echoed.
    pub async fn create_laptop(&self, payload: &LaptopPayload) -> ApiResult<Option<Laptop>> {
        self.request_json(Method::POST, "/laptops", payload, Auth::Required)
            .await
    }

    /// Replace a laptop's fields (admin). Returns the stored laptop when echoed.
    pub async fn update_laptop(
        &self,
        id: &str,
        payload: &LaptopPayload,
    ) -> ApiResult<Option<Laptop>> {
        self.request_json(Method::PUT, &laptop_path(id), payload, Auth::Required)
            .await
    }

    pub async fn delete_laptop(&self, id: &str) -> ApiResult<()> {
        let _: Option<serde_json::Value> = self
            .request(Method::DELETE, &laptop_path(id), Auth::Required)
            .await?;
        Ok(())
    }

    // ============ Request plumbing ============

    /// Send a bodiless request. `Ok(None)` is an empty success.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        auth: Auth,
    ) -> ApiResult<Option<T>> {
        Ok(self.send(method, endpoint, auth).await?.body)
    }

    /// Send a request with a JSON body. `Ok(None)` is an empty success.
    pub async fn request_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
        auth: Auth,
    ) -> ApiResult<Option<T>> {
        Ok(self.send_json(method, endpoint, body, auth).await?.body)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        auth: Auth,
    ) -> ApiResult<Reply<T>> {
        let builder = self.builder(method.clone(), endpoint, auth);
        self.execute(builder, method, endpoint).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
        auth: Auth,
    ) -> ApiResult<Reply<T>> {
        let builder = self.builder(method.clone(), endpoint, auth).json(body);
        self.execute(builder, method, endpoint).await
    }

    fn builder(&self, method: Method, endpoint: &str, auth: Auth) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut builder = self
            .http
            .request(method, url)
            .header(header::ACCEPT, "application/json");

        if auth == Auth::Required {
            match self.tokens.load() {
                Ok(Some(token)) => builder = builder.bearer_auth(token),
                Ok(None) => {
                    tracing::warn!(endpoint, "Auth token not found for protected route");
                }
                Err(e) => {
                    tracing::warn!(endpoint, error = %e, "Failed to read auth token");
                }
            }
        }

        builder
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        method: Method,
        endpoint: &str,
    ) -> ApiResult<Reply<T>> {
        let response = builder.send().await.map_err(|e| {
            tracing::debug!(%method, endpoint, error = %e, "Request did not reach the backend");
            ApiError::network(&self.base_url, e)
        })?;

        let status = response.status();
        tracing::debug!(%method, endpoint, status = status.as_u16(), "Backend responded");

        if !status.is_success() {
            let reason = status.canonical_reason();
            let body = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(endpoint, error = %e, "Failed to read error response body");
                    String::new()
                }
            };
            return Err(ApiError::from_response(status.as_u16(), reason, &body));
        }

        let body = self.decode_success(response, endpoint).await?;
        Ok(Reply { status, body })
    }

    /// Decode a 2xx response: JSON is decoded, anything empty or non-JSON
    /// is an empty success.
    async fn decode_success<T: DeserializeOwned>(
        &self,
        response: Response,
        endpoint: &str,
    ) -> ApiResult<Option<T>> {
        let status = response.status();

        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Ok(None);
        }

        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        if !is_json {
            tracing::debug!(endpoint, "Non-JSON success response treated as empty");
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(&self.base_url, e))?;

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(None);
        }

        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            ApiError::invalid_response(
                status.as_u16(),
                format!("Invalid response from {}: {}", endpoint, e),
            )
        })
    }
}

fn laptop_path(id: &str) -> String {
    format!("/laptops/{}", urlencoding::encode(id))
}

fn require_body<T>(reply: Reply<T>, endpoint: &str) -> ApiResult<T> {
    let status = reply.status.as_u16();
    reply.body.ok_or_else(|| {
        ApiError::invalid_response(status, format!("Empty response from {}", endpoint))
    })
}

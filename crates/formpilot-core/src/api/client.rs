//! API client for the forms backend.
//!
//! The client mirrors a browser HTTP client with "default headers": a token
//! installed with [`ApiClient::set_authorization`] is attached to every
//! request made through this client or any of its clones.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::auth::Credentials;
use crate::config::Config;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Endpoint that creates a new user account
const USER_PATH: &str = "/api/user";

/// Endpoint that exchanges credentials for a token
const LOGIN_PATH: &str = "/api/auth/login";

/// Successful login body. Only the token is read.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// API client for the forms backend.
/// Clone is cheap and clones share both the connection pool and the
/// default header map.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    default_headers: Arc<RwLock<header::HeaderMap>>,
}

impl ApiClient {
    /// Create a new API client from configuration.
    /// A `request_timeout_secs` of 0 disables the request timeout.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let timeout = match config.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self::build(&config.api_base_url, timeout)
    }

    /// Create a client against an explicit base URL
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        Self::build(base_url, Some(timeout))
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: Arc::new(RwLock::new(header::HeaderMap::new())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install `token` as the `Authorization` header for all later requests.
    /// The value is sent as-is, without a scheme prefix.
    pub fn set_authorization(&self, token: &str) -> Result<(), ApiError> {
        let mut value = header::HeaderValue::from_str(token)
            .map_err(|_| ApiError::InvalidHeader("Authorization"))?;
        value.set_sensitive(true);
        self.default_headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(header::AUTHORIZATION, value);
        Ok(())
    }

    /// Remove the `Authorization` default header, if any
    pub fn clear_authorization(&self) {
        self.default_headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(header::AUTHORIZATION);
    }

    /// The currently installed `Authorization` value
    pub fn authorization(&self) -> Option<String> {
        self.default_headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self) -> header::HeaderMap {
        self.default_headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send_post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "POST");

        // `json` also sets Content-Type: application/json
        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await?;

        Self::check_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send_post(path, body).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} from {}", e, path)))
    }

    // ===== Endpoints =====

    /// Create a user account. The response body is not inspected.
    pub async fn create_user(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.send_post(USER_PATH, credentials).await?;
        Ok(())
    }

    /// Log in and return the token issued by the backend
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.post(LOGIN_PATH, credentials).await
    }
}

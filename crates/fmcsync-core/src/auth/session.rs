//! Authenticated session against the management API.
//!
//! A `Session` reuses the token in its `TokenCell` until the server rejects
//! it with 401. The rejected call is then re-sent once with a fresh token;
//! a second 401 is terminal. Every logical call therefore makes at most two
//! request attempts and at most one extra token exchange.

use std::time::Duration;

use reqwest::{header, Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{Credentials, TokenCell};
use crate::api::ApiError;

/// Header the management API uses for both issuing and presenting tokens
pub const TOKEN_HEADER: &str = "X-auth-access-token";

/// Token issuance endpoint (basic auth, token returned in `TOKEN_HEADER`)
pub const TOKEN_PATH: &str = "/api/fmc_platform/v1/auth/generatetoken";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Attempts per logical call: the original send plus one after a refresh.
const MAX_ATTEMPTS: u32 = 2;

/// A fully-formed request minus the token, which the session supplies.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Either a path starting with `/` (joined to the session base URL)
    /// or an absolute URL.
    pub target: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn put(target: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, target).with_body(body)
    }

    pub fn post(target: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, target).with_body(body)
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Authenticated API session.
/// Clone is cheap - the HTTP client and token cell are both shared.
#[derive(Clone)]
pub struct Session {
    client: Client,
    credentials: Credentials,
    base_url: String,
    token: TokenCell,
}

impl Session {
    /// Create a session for the given credentials, storing tokens in `token`
    pub fn new(credentials: Credentials, token: TokenCell) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .danger_accept_invalid_certs(!credentials.verify_ssl)
            .build()
            .map_err(ApiError::transport)?;

        let base_url = credentials.base_url();
        Ok(Self {
            client,
            credentials,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_cell(&self) -> &TokenCell {
        &self.token
    }

    /// Resolve a request target to an absolute URL
    pub fn url(&self, target: &str) -> String {
        if target.starts_with("https://") || target.starts_with("http://") {
            target.to_string()
        } else {
            format!("{}{}", self.base_url, target)
        }
    }

    /// Return the held token, or authenticate when none is held or a
    /// refresh is forced. A failed exchange leaves the held token untouched.
    pub async fn obtain_token(&self, force_refresh: bool) -> Result<String, ApiError> {
        if !force_refresh {
            if let Some(token) = self.token.get() {
                debug!("Reusing held access token");
                return Ok(token);
            }
        }

        if !self.credentials.is_complete() {
            return Err(ApiError::AuthenticationFailed(
                "host, username and password must all be configured".to_string(),
            ));
        }

        let url = self.url(TOKEN_PATH);
        debug!(url = %url, force_refresh, "Requesting access token");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::AuthenticationFailed(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::AuthenticationFailed(format!(
                "token endpoint returned {}: {}",
                status,
                ApiError::truncate_body(&body)
            )));
        }

        let token = response
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::AuthenticationFailed(format!(
                    "token endpoint response carried no {} header",
                    TOKEN_HEADER
                ))
            })?;

        self.token.replace(token.clone());
        info!(user = %self.credentials.username, "Obtained new access token");
        Ok(token)
    }

    /// Send `request` with the current token and decode the JSON body.
    ///
    /// A 401 triggers one forced refresh and one re-send. Any other failure
    /// is returned to the caller without retrying.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let url = self.url(&request.target);
        let mut token = self.obtain_token(false).await?;

        for attempt in 1..=MAX_ATTEMPTS {
            let response = self.send(request, &url, &token).await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return Self::decode(response, &url).await;
            }

            if attempt == MAX_ATTEMPTS {
                warn!(url = %url, "Access token rejected after refresh");
                break;
            }

            warn!(url = %url, "Access token rejected, refreshing and retrying once");
            token = self.obtain_token(true).await?;
        }

        Err(ApiError::AuthorizationExhausted)
    }

    async fn send(&self, request: &ApiRequest, url: &str, token: &str) -> Result<Response, ApiError> {
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(TOKEN_HEADER, token)
            .header(header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(ApiError::transport)
    }

    /// Map a non-401 response to its decoded body or a `RequestFailed`.
    async fn decode(response: Response, url: &str) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let bytes = response.bytes().await.map_err(ApiError::transport)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }
}

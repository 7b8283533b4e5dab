//! Hospital Backend Client
//!
//! One request client for the whole application: a single configured base
//! address and a single token accessor. Endpoint methods live in
//! [`crate::api`] as further `impl ApiClient` blocks.
//!
//! Every authenticated request follows the same contract:
//!
//! 1. read the session token; if absent, fail with
//!    [`ClientError::AuthRequired`] without touching the network
//! 2. send the request with `Authorization: Bearer <token>`
//! 3. on 2xx decode the JSON body; otherwise take the first non-blank
//!    `message` or `error` string out of the error body
//!
//! No retry, no backoff, no cancellation.

mod error;

pub use error::{ClientError, ClientResult, AUTH_REQUIRED_MESSAGE};

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::BackendConfig;
use crate::session::TokenStore;

/// REST client for the hospital backend
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the configured backend
    pub fn new(config: &BackendConfig, session: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let base_url = normalize_base_url(&config.base_url)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("medidesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token store this client reads from
    pub fn session(&self) -> &Arc<dyn TokenStore> {
        &self.session
    }

    /// Whether a session token is currently stored
    pub async fn has_session(&self) -> ClientResult<bool> {
        Ok(self.session.get_token().await?.is_some())
    }

    /// Join an endpoint path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Resolve a path the backend handed back (e.g. a QR image path).
    /// Absolute URLs pass through unchanged.
    pub fn resolve(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            self.url(path_or_url)
        }
    }

    async fn bearer(&self) -> ClientResult<String> {
        match self.session.get_token().await? {
            Some(token) => Ok(token),
            None => {
                tracing::warn!("No session token found; request not sent");
                Err(ClientError::AuthRequired)
            }
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Authenticated GET returning decoded JSON
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let token = self.bearer().await?;
        let request = self.request(Method::GET, path).bearer_auth(token);
        let response = self.execute(request, &Method::GET, path, MESSAGE_FIRST).await?;
        decode(response).await
    }

    /// Authenticated POST with an optional JSON body, returning decoded JSON
    pub async fn post_json<B, T>(&self, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.bearer().await?;
        let mut request = self.request(Method::POST, path).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.execute(request, &Method::POST, path, MESSAGE_FIRST).await?;
        decode(response).await
    }

    /// Authenticated POST without a body whose response body is ignored
    pub async fn post_unit(&self, path: &str) -> ClientResult<()> {
        let token = self.bearer().await?;
        let request = self.request(Method::POST, path).bearer_auth(token);
        self.execute(request, &Method::POST, path, MESSAGE_FIRST).await?;
        Ok(())
    }

    /// Unauthenticated POST with a JSON body
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(body);
        let response = self.execute(request, &Method::POST, path, ERROR_FIRST).await?;
        decode(response).await
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        method: &Method,
        path: &str,
        error_keys: &[&str],
    ) -> ClientResult<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(%method, path, error = %e, "Request failed");
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%method, path, status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = extract_error_message(&text, error_keys);

        tracing::error!(
            %method,
            path,
            status = status.as_u16(),
            detail = message.as_deref().unwrap_or(""),
            "Backend returned an error"
        );

        Err(ClientError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(error = %e, "Failed to decode response body");
        ClientError::Decode(e.to_string())
    })
}

/// Error body keys tried in order on authenticated endpoints
const MESSAGE_FIRST: &[&str] = &["message", "error"];

/// The public intake endpoint reports problems under `error`
const ERROR_FIRST: &[&str] = &["error", "message"];

fn normalize_base_url(raw: &str) -> ClientResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ClientError::InvalidUrl(format!(
            "{}: scheme must be http or https",
            raw
        )));
    }

    Ok(trimmed.to_string())
}

/// Best-effort extraction of a human message from an error body.
///
/// Tries `keys` in order and takes the first non-blank string; non-JSON
/// bodies yield nothing.
pub(crate) fn extract_error_message(body: &str, keys: &[&str]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter_map(|v| v.as_str())
        .find(|m| !m.trim().is_empty())
        .map(str::to_string)
}

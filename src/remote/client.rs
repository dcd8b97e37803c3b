use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::query::Query;

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Default per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Errors from the hosted data store.
///
/// All of them are recoverable at the cache layer; callers of the cached
/// reads never see these.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    /// Non-2xx response without a readable error body
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Non-2xx response carrying a PostgREST error object
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
    #[error("No backend configured")]
    NotConfigured,
}

/// PostgREST error body: `{"message": "...", "code": "...", ...}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// HTTPS client for the hosted Postgres REST endpoint.
///
/// Every request carries the project's anon key as `apikey`, and either the
/// signed-in user's access token or the anon key as the bearer token.
pub struct SupabaseClient {
    http: reqwest::Client,
    base: Url,
    anon_key: SecretString,
    access_token: Option<SecretString>,
    timeout: Duration,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base", &self.base.as_str())
            .field("anon_key", &"[REDACTED]")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SupabaseClient {
    /// Create a client for the project at `base_url`.
    ///
    /// # Errors
    ///
    /// - [`RemoteError::InvalidBaseUrl`] if `base_url` does not parse
    /// - [`RemoteError::InsecureBaseUrl`] for plain HTTP to anything but localhost
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        anon_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let mut base = Url::parse(base_url)?;

        // The anon key and access token travel in headers; never send them in clear text.
        if base.scheme() != "https" {
            let is_localhost = base.scheme() == "http"
                && matches!(base.host_str(), Some("localhost") | Some("127.0.0.1"));
            if !is_localhost {
                tracing::error!(base_url = %base, "Rejecting non-HTTPS base URL");
                return Err(RemoteError::InsecureBaseUrl);
            }
            tracing::warn!(base_url = %base, "Using non-HTTPS base URL (localhost only)");
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http,
            base,
            anon_key,
            access_token: None,
            timeout,
        })
    }

    /// Authenticate requests as a signed-in user.
    pub fn with_access_token(mut self, token: SecretString) -> Self {
        self.access_token = Some(token);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET rest/v1/{table}` and decode the JSON array of rows.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, RemoteError> {
        let url = self.base.join(&format!("rest/v1/{table}"))?;
        let bearer = self
            .access_token
            .as_ref()
            .unwrap_or(&self.anon_key)
            .expose_secret();

        let request = self
            .http
            .get(url)
            .query(query.params())
            .header("apikey", self.anon_key.expose_secret())
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {bearer}"))
            .header(reqwest::header::ACCEPT, "application/json");

        tracing::debug!(table = %table, params = query.params().len(), "Querying remote table");

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| RemoteError::Timeout(self.timeout.as_secs()))?
            .map_err(RemoteError::Network)?;

        let status = response.status();
        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &bytes));
        }

        let rows: Vec<T> = serde_json::from_slice(&bytes)?;
        tracing::debug!(table = %table, rows = rows.len(), "Remote query succeeded");
        Ok(rows)
    }
}

fn api_error(status: u16, body: &[u8]) -> RemoteError {
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(err) => {
            tracing::debug!(status = status, code = ?err.code, "Remote returned error object");
            RemoteError::Api {
                status,
                message: err.message,
            }
        }
        Err(_) => RemoteError::HttpStatus(status),
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, RemoteError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(RemoteError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(RemoteError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(RemoteError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

//! HTTP client for the Reader API
//!
//! One `ReaderClient` is built at startup and shared read-only by every
//! request. Dropping it releases the connection pool.

use crate::models::ListResponse;
use crate::query::ListQuery;
use async_trait::async_trait;
use reader_common::sanitizer::LogSanitizer;
use reader_common::{ReaderError, Result};
use reader_config::Config;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

/// Upstream error bodies are cut to this many characters
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Operations the MCP tools need from the Reader API
#[async_trait]
pub trait ReaderApi: Send + Sync {
    /// Fetch one page of documents matching `query`
    async fn fetch_list(&self, query: &ListQuery) -> Result<ListResponse>;

    /// Check that the configured token is accepted
    async fn verify_token(&self) -> Result<()>;
}

/// reqwest-backed implementation of [`ReaderApi`]
pub struct ReaderClient {
    http: reqwest::Client,
    list_url: String,
    auth_url: String,
    timeout_secs: u64,
    sanitizer: LogSanitizer,
}

impl ReaderClient {
    pub const LIST_PATH: &'static str = "/list/";

    /// Build the client with the token header and timeout from `config`
    pub fn new(config: &Config) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Token {}", config.access_token.expose()))
            .map_err(|_| {
                ReaderError::ConfigError(
                    "access token contains characters not allowed in an HTTP header".to_string(),
                )
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .user_agent(concat!("reader-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReaderError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let list_url = format!(
            "{}{}",
            config.api.base_url.trim_end_matches('/'),
            Self::LIST_PATH
        );

        tracing::debug!(url = %list_url, timeout_secs = config.api.timeout_secs, "Reader client opened");

        Ok(Self {
            http,
            list_url,
            auth_url: config.api.auth_url.clone(),
            timeout_secs: config.api.timeout_secs,
            sanitizer: LogSanitizer::new().with_secret(config.access_token.expose()),
        })
    }

    pub fn list_url(&self) -> &str {
        &self.list_url
    }

    /// `GET /list/` returning the body untouched
    pub async fn fetch_list_raw(&self, query: &ListQuery) -> Result<Value> {
        let response = self
            .http
            .get(&self.list_url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let response = self.check_status(response).await?;

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                ReaderError::InvalidResponse(self.sanitizer.sanitize(&e.to_string()))
            } else {
                self.transport_error(e)
            }
        })
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ReaderError::Upstream {
            status: status.as_u16(),
            body: self.sanitizer.sanitize_truncated(body.trim(), MAX_ERROR_BODY_CHARS),
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> ReaderError {
        if err.is_timeout() {
            return ReaderError::NetworkError(format!(
                "request timed out after {}s",
                self.timeout_secs
            ));
        }
        ReaderError::NetworkError(self.sanitizer.sanitize(&err.to_string()))
    }
}

#[async_trait]
impl ReaderApi for ReaderClient {
    async fn fetch_list(&self, query: &ListQuery) -> Result<ListResponse> {
        tracing::debug!(?query, "GET {}", self.list_url);
        let body = self.fetch_list_raw(query).await?;
        ListResponse::from_value(body)
    }

    async fn verify_token(&self) -> Result<()> {
        let response = self
            .http
            .get(&self.auth_url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.check_status(response).await?;
        tracing::info!("Reader access token verified");
        Ok(())
    }
}

impl Drop for ReaderClient {
    fn drop(&mut self) {
        tracing::debug!("Reader client closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reader_config::AccessToken;

    fn config(base_url: &str) -> Config {
        let mut config = Config::default();
        config.access_token = AccessToken::new("abc123");
        config.api.base_url = base_url.to_string();
        config
    }

    #[test]
    fn test_list_url_joins_without_double_slash() {
        let client = ReaderClient::new(&config("https://readwise.io/api/v3/")).unwrap();
        assert_eq!(client.list_url(), "https://readwise.io/api/v3/list/");

        let client = ReaderClient::new(&config("https://readwise.io/api/v3")).unwrap();
        assert_eq!(client.list_url(), "https://readwise.io/api/v3/list/");
    }

    #[test]
    fn test_token_with_newline_rejected() {
        let mut config = config("https://readwise.io/api/v3");
        config.access_token = AccessToken::new("abc\n123");
        assert!(matches!(
            ReaderClient::new(&config),
            Err(ReaderError::ConfigError(_))
        ));
    }
}

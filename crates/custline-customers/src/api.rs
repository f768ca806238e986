//! Customer API transport.
//!
//! [`CustomerApi`] is the seam between retry/orchestration logic and the
//! HTTP transport; [`HttpApi`] is the reqwest-backed production
//! implementation, blocking on the shared runtime per request.

use custline_core::{http_client, http_config, SHARED_RUNTIME};
use serde_json::json;

use crate::config::{Credentials, PAGE_SIZE};

/// Opaque bearer token. Replaced wholesale on refresh, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Status and body of one HTTP exchange, before retry classification.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Transport-level failure for one attempt.
#[derive(Debug, Clone)]
pub enum TransportError {
    /// No reply within the request timeout
    Timeout,
    /// Any other transport failure (connect, TLS, protocol)
    Other(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// HTTP boundary of the customer API.
pub trait CustomerApi {
    /// `POST {base}/login` with the configured credentials.
    fn login(&self) -> Result<HttpReply, TransportError>;

    /// `GET {base}/customers?page=N&limit=100` with a bearer token.
    fn get_page(&self, page: u32, token: &Token) -> Result<HttpReply, TransportError>;
}

/// Production transport over the shared reqwest client.
pub struct HttpApi {
    base_url: String,
    credentials: Credentials,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn execute(&self, request: reqwest::RequestBuilder) -> Result<HttpReply, TransportError> {
        let timeout = http_config().request_timeout;
        SHARED_RUNTIME.handle().block_on(async {
            let response = request.timeout(timeout).send().await.map_err(classify)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(classify)?;
            Ok(HttpReply { status, body })
        })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Other(e.to_string())
    }
}

impl CustomerApi for HttpApi {
    fn login(&self) -> Result<HttpReply, TransportError> {
        let url = format!("{}/login", self.base_url);
        let payload = json!({
            "username": self.credentials.username,
            "password": self.credentials.password,
        });
        self.execute(http_client().post(&url).json(&payload))
    }

    fn get_page(&self, page: u32, token: &Token) -> Result<HttpReply, TransportError> {
        let url = format!("{}/customers", self.base_url);
        self.execute(
            http_client()
                .get(&url)
                .header(reqwest::header::AUTHORIZATION, token.bearer())
                .query(&[("page", page), ("limit", PAGE_SIZE)]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            username: "user".to_string(),
            password: "pass".to_string(),
        }
    }

    #[test]
    fn token_bearer_header() {
        let token = Token::new("abc123");
        assert_eq!(token.bearer(), "Bearer abc123");
        assert_eq!(token.as_str(), "abc123");
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let api = HttpApi::new("https://api.example.com/", credentials());
        assert_eq!(api.base_url(), "https://api.example.com");
    }

    #[test]
    fn base_url_kept_without_slash() {
        let api = HttpApi::new("https://api.example.com", credentials());
        assert_eq!(api.base_url(), "https://api.example.com");
    }
}

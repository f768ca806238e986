//! Token acquisition via the login endpoint

use serde::Deserialize;

use crate::api::{CustomerApi, Token, TransportError};

/// Failure to obtain a bearer token. Fatal for the run; never retried here.
#[derive(Debug)]
pub enum AuthError {
    /// Login endpoint returned a non-200 status
    Status(u16),
    /// 200 reply without a usable `access_token`
    MalformedReply(String),
    /// Transport failure before any status was received
    Transport(TransportError),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "login failed with HTTP {code}"),
            Self::MalformedReply(msg) => write!(f, "malformed login reply: {msg}"),
            Self::Transport(e) => write!(f, "login transport error: {e}"),
        }
    }
}

impl std::error::Error for AuthError {}

#[derive(Deserialize)]
struct LoginReply {
    #[serde(default)]
    access_token: String,
}

/// Exchange the configured credentials for a fresh bearer token.
///
/// Every call is a full network round trip; tokens are never cached
/// here. The caller owns the returned token and decides when to refresh.
pub fn authenticate<A: CustomerApi>(api: &A) -> Result<Token, AuthError> {
    let reply = api.login().map_err(AuthError::Transport)?;
    if reply.status != 200 {
        log::error!("failed to obtain token: HTTP {}", reply.status);
        return Err(AuthError::Status(reply.status));
    }

    let parsed: LoginReply =
        serde_json::from_str(&reply.body).map_err(|e| AuthError::MalformedReply(e.to_string()))?;
    if parsed.access_token.is_empty() {
        return Err(AuthError::MalformedReply(
            "missing access_token".to_string(),
        ));
    }

    log::info!("obtained new access token");
    Ok(Token::new(parsed.access_token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HttpReply;

    /// Fake transport whose login always returns the given reply.
    struct LoginApi(HttpReply);

    impl CustomerApi for LoginApi {
        fn login(&self) -> Result<HttpReply, TransportError> {
            Ok(self.0.clone())
        }

        fn get_page(&self, _page: u32, _token: &Token) -> Result<HttpReply, TransportError> {
            unreachable!("auth tests never fetch pages")
        }
    }

    #[test]
    fn login_success_returns_token() {
        let api = LoginApi(HttpReply::new(200, r#"{"access_token": "tok-1"}"#));
        let token = authenticate(&api).unwrap();
        assert_eq!(token.as_str(), "tok-1");
    }

    #[test]
    fn login_non_200_is_status_error() {
        let api = LoginApi(HttpReply::new(401, r#"{"error": "bad credentials"}"#));
        match authenticate(&api) {
            Err(AuthError::Status(401)) => {}
            other => panic!("expected Status(401), got {other:?}"),
        }
    }

    #[test]
    fn login_missing_token_is_malformed() {
        let api = LoginApi(HttpReply::new(200, r#"{"expires_in": 3600}"#));
        assert!(matches!(
            authenticate(&api),
            Err(AuthError::MalformedReply(_))
        ));
    }

    #[test]
    fn login_empty_token_is_malformed() {
        let api = LoginApi(HttpReply::new(200, r#"{"access_token": ""}"#));
        assert!(matches!(
            authenticate(&api),
            Err(AuthError::MalformedReply(_))
        ));
    }

    #[test]
    fn login_garbage_body_is_malformed() {
        let api = LoginApi(HttpReply::new(200, "<html>gateway</html>"));
        assert!(matches!(
            authenticate(&api),
            Err(AuthError::MalformedReply(_))
        ));
    }

    #[test]
    fn login_transport_error_propagates() {
        struct BrokenApi;
        impl CustomerApi for BrokenApi {
            fn login(&self) -> Result<HttpReply, TransportError> {
                Err(TransportError::Other("connection refused".to_string()))
            }
            fn get_page(&self, _: u32, _: &Token) -> Result<HttpReply, TransportError> {
                unreachable!()
            }
        }
        assert!(matches!(
            authenticate(&BrokenApi),
            Err(AuthError::Transport(_))
        ));
    }
}

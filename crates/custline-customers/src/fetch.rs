//! Page retrieval with bounded retry and per-status backoff

use custline_core::{rate_limit_backoff, server_backoff, Sleeper};

use crate::api::{CustomerApi, Token, TransportError};
use crate::model::Page;

/// Terminal outcome of fetching one page.
#[derive(Debug)]
pub enum FetchOutcome {
    /// HTTP 200 with a parseable body
    Success(Page),
    /// HTTP 403 — the bearer token is stale; surfaced immediately so the
    /// driver can refresh and retry at its own level
    TokenExpired,
    /// Retry budget spent without a terminal reply
    Exhausted,
    /// Unclassified failure; not retried
    Fatal(String),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Short label for log and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::TokenExpired => "token expired",
            Self::Exhausted => "retries exhausted",
            Self::Fatal(_) => "fatal error",
        }
    }
}

/// Fetch one page of customers, retrying transient failures.
///
/// The attempt counter starts at 0 and advances only on retryable
/// conditions:
/// - 429: sleep `2^attempt + 1` seconds
/// - 500/503 and request timeouts: sleep `2^attempt` seconds
/// - any other unexpected status: no sleep, but still consumes an attempt
///
/// 403 returns [`FetchOutcome::TokenExpired`] at once without touching
/// the counter; transport failures other than timeouts return
/// [`FetchOutcome::Fatal`] without retrying.
pub fn fetch_page<A, S>(
    api: &A,
    sleeper: &S,
    page: u32,
    token: &Token,
    max_retries: u32,
) -> FetchOutcome
where
    A: CustomerApi,
    S: Sleeper,
{
    let mut attempt = 0u32;

    while attempt < max_retries {
        match api.get_page(page, token) {
            Ok(reply) => match reply.status {
                200 => match serde_json::from_str::<Page>(&reply.body) {
                    Ok(parsed) => return FetchOutcome::Success(parsed),
                    Err(e) => {
                        log::error!("page {page}: unparseable 200 body: {e}");
                        return FetchOutcome::Fatal(format!("invalid page body: {e}"));
                    }
                },
                429 => {
                    let wait = rate_limit_backoff(attempt);
                    log::warn!(
                        "page {page}: rate limited, retrying in {}s",
                        wait.as_secs()
                    );
                    sleeper.sleep(wait);
                    attempt += 1;
                }
                500 | 503 => {
                    let wait = server_backoff(attempt);
                    log::warn!(
                        "page {page}: server error {}, retry {}/{max_retries} in {}s",
                        reply.status,
                        attempt + 1,
                        wait.as_secs()
                    );
                    sleeper.sleep(wait);
                    attempt += 1;
                }
                403 => {
                    log::warn!("page {page}: token expired, refresh needed");
                    return FetchOutcome::TokenExpired;
                }
                status => {
                    log::warn!("page {page}: unexpected HTTP {status}");
                    attempt += 1;
                }
            },
            Err(TransportError::Timeout) => {
                let wait = server_backoff(attempt);
                log::warn!(
                    "page {page}: timeout, retry {}/{max_retries} in {}s",
                    attempt + 1,
                    wait.as_secs()
                );
                sleeper.sleep(wait);
                attempt += 1;
            }
            Err(TransportError::Other(e)) => {
                log::error!("page {page}: {e}");
                return FetchOutcome::Fatal(e);
            }
        }
    }

    log::error!("page {page}: giving up after {max_retries} attempts");
    FetchOutcome::Exhausted
}

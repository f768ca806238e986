//! Shared HTTP client and runtime.
//!
//! Uses async reqwest internally but presents a sync interface: the
//! pipeline is strictly sequential, so callers block on the shared
//! runtime for each request.

use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

/// Per-request timeout (10 seconds with no reply = timeout)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default retry budget per page
const MAX_RETRIES: u32 = 5;

/// Process-wide HTTP settings, set once at startup.
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: REQUEST_TIMEOUT,
            max_retries: MAX_RETRIES,
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install process-wide HTTP settings. Only the first call takes effect.
pub fn set_http_config(config: HttpConfig) {
    let _ = HTTP_CONFIG.set(config);
}

/// Current HTTP settings (defaults if never set).
pub fn http_config() -> HttpConfig {
    HTTP_CONFIG.get().copied().unwrap_or_default()
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP and S3 operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_http_config() {
        let config = HttpConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 5);
    }
}

//! Ingestion pipeline configuration

use std::path::PathBuf;

/// Records requested per page; fixed, communicated to the server as
/// `limit`, never negotiated.
pub const PAGE_SIZE: u32 = 100;

/// Default name of the local CSV artifact.
pub const DEFAULT_FILE_NAME: &str = "customers_raw.csv";

/// Credentials for the login endpoint.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Manual Debug keeps the password out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Runtime configuration for the customer ingestion pipeline.
///
/// Built explicitly by the caller (the CLI reads environment and config
/// files); the pipeline itself never touches the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// API base URL, e.g. `https://api.example.com`
    pub base_url: String,
    pub credentials: Credentials,
    /// Directory for the local CSV artifact
    pub output_dir: PathBuf,
    /// File name of the CSV artifact within `output_dir`
    pub file_name: String,
    /// Retry budget per page
    pub max_retries: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials {
            username: "svc-ingest".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("svc-ingest"));
        assert!(!debug.contains("hunter2"));
    }
}

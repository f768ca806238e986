//! Configuration loading from TOML files and the environment

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for custline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub output: OutputConfig,
    pub s3: S3Config,
    pub http: HttpSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub username: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub password: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("API_BASE_URL").unwrap_or_default(),
            username: std::env::var("API_USERNAME").ok(),
            password: std::env::var("API_PASSWORD").ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data"),
            file_name: custline_customers::config::DEFAULT_FILE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub bucket: Option<String>,
    pub prefix: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: std::env::var("AWS_BUCKET_NAME").ok(),
            prefix: "raw/customers".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub request_timeout: u64,
    pub max_retries: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10,
            max_retries: 5,
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./custline.toml (current directory)
    /// 2. ~/.config/custline/config.toml
    ///
    /// If no config file found, returns default config (environment
    /// variables only).
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("custline.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "custline") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_http_settings() {
        let config = Config::default();
        assert_eq!(config.http.request_timeout, 10);
        assert_eq!(config.http.max_retries, 5);
        assert_eq!(config.output.file_name, "customers_raw.csv");
        assert_eq!(config.s3.prefix, "raw/customers");
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("CUSTLINE_TEST_VAR", "test_value");
        assert_eq!(
            expand_env_var("${CUSTLINE_TEST_VAR}"),
            Some("test_value".to_string())
        );
        std::env::remove_var("CUSTLINE_TEST_VAR");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${CUSTLINE_NONEXISTENT_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[api]
base_url = "https://api.example.com"
username = "svc-ingest"

[output]
dir = "/tmp/custline"
file_name = "customers.csv"

[s3]
bucket = "data-lake"
prefix = "raw/customers"

[http]
request_timeout = 20
max_retries = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.username.as_deref(), Some("svc-ingest"));
        assert_eq!(config.output.dir, PathBuf::from("/tmp/custline"));
        assert_eq!(config.output.file_name, "customers.csv");
        assert_eq!(config.s3.bucket.as_deref(), Some("data-lake"));
        assert_eq!(config.http.request_timeout, 20);
        assert_eq!(config.http.max_retries, 3);
    }

    #[test]
    fn parse_config_env_reference() {
        std::env::set_var("CUSTLINE_TEST_PASSWORD", "s3cret");
        let toml = r#"
[api]
base_url = "https://api.example.com"
password = "${CUSTLINE_TEST_PASSWORD}"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.password.as_deref(), Some("s3cret"));
        std::env::remove_var("CUSTLINE_TEST_PASSWORD");
    }
}

//! Custline Core - Common infrastructure for customer data ingestion
//!
//! This crate provides the components shared by the ingestion pipeline
//! and the CLI: HTTP client plumbing, retry backoff, logging, progress
//! reporting, the CSV sink, and the S3 uploader.

pub mod backoff;
pub mod http;
pub mod logging;
pub mod progress;
pub mod sink;
pub mod upload;

// Re-exports for convenience
pub use backoff::{rate_limit_backoff, server_backoff, Sleeper, ThreadSleeper};
pub use http::{http_client, http_config, set_http_config, HttpConfig, SHARED_RUNTIME};
pub use logging::{init_logging, IndicatifLogger};
pub use progress::{fmt_num, ProgressContext, SharedProgress};
pub use sink::{CsvSink, SinkError};
pub use upload::{S3Uploader, UploadError};

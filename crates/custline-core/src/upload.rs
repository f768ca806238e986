//! S3 upload for finished run artifacts.
//!
//! Sync facade over the AWS SDK using the shared runtime; credentials
//! and region come from the standard AWS environment/profile chain.

use std::path::Path;

use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::http::SHARED_RUNTIME;

/// Error from the object-storage upload.
#[derive(Debug)]
pub enum UploadError {
    /// Key rejected before any request was made
    InvalidKey(String),
    /// SDK or service failure
    Backend(String),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(msg) => write!(f, "invalid object key: {msg}"),
            Self::Backend(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for UploadError {}

/// S3 client bound to a single bucket.
pub struct S3Uploader {
    client: Client,
    bucket: String,
}

impl S3Uploader {
    /// Build a client from the default AWS credential/region chain.
    pub fn new(bucket: impl Into<String>) -> Self {
        let shared = SHARED_RUNTIME
            .handle()
            .block_on(aws_config::defaults(BehaviorVersion::latest()).load());
        Self {
            client: Client::new(&shared),
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload a local file to `s3://{bucket}/{key}`.
    pub fn upload_file(&self, path: &Path, key: &str) -> Result<(), UploadError> {
        validate_key(key)?;
        SHARED_RUNTIME.handle().block_on(async {
            let body = ByteStream::from_path(path)
                .await
                .map_err(|e| UploadError::Backend(format!("read {}: {e}", path.display())))?;
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .body(body)
                .send()
                .await
                .map_err(|e| UploadError::Backend(format!("s3 put_object: {e}")))?;
            Ok(())
        })
    }
}

/// Reject keys that would escape the intended bucket layout.
pub fn validate_key(key: &str) -> Result<(), UploadError> {
    if key.trim().is_empty() {
        return Err(UploadError::InvalidKey("key is empty".to_string()));
    }
    if key.starts_with('/') {
        return Err(UploadError::InvalidKey(
            "key must not start with '/'".to_string(),
        ));
    }
    if key.split('/').any(|seg| seg == "..") {
        return Err(UploadError::InvalidKey(
            "key must not contain '..' segments".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_key_accepted() {
        assert!(validate_key("raw/customers/date=2026-08-07/customers_raw.csv").is_ok());
    }

    #[test]
    fn empty_key_rejected() {
        assert!(matches!(validate_key(""), Err(UploadError::InvalidKey(_))));
        assert!(matches!(
            validate_key("   "),
            Err(UploadError::InvalidKey(_))
        ));
    }

    #[test]
    fn leading_slash_rejected() {
        assert!(matches!(
            validate_key("/raw/customers.csv"),
            Err(UploadError::InvalidKey(_))
        ));
    }

    #[test]
    fn parent_segment_rejected() {
        assert!(matches!(
            validate_key("raw/../secrets"),
            Err(UploadError::InvalidKey(_))
        ));
    }
}

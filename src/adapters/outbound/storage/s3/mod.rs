//! S3-compatible store construction using the object_store crate.
//!
//! Connection parameters are handed to the SDK builder as-is; MinIO is the
//! same store with a custom endpoint.

use anyhow::{Context, Result};
use object_store::{
    aws::{AmazonS3Builder, AmazonS3ConfigKey},
    ObjectStore as ObjectStoreBackend,
};
use std::sync::Arc;

/// Configuration for S3 storage backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Temporary credentials (STS) carry a session token alongside the keys
    pub session_token: Option<String>,
    pub endpoint: Option<String>,
    /// Permit plain-HTTP endpoints (local MinIO)
    pub allow_http: bool,
}

/// Build an S3 store bound to `config.bucket`.
///
/// Unset credentials are left to the builder, which then signs with whatever
/// it can find (instance metadata, web identity) at request time.
pub fn create_s3_store(config: &S3Config) -> Result<Arc<dyn ObjectStoreBackend>> {
    let optional = [
        (AmazonS3ConfigKey::AccessKeyId, &config.access_key),
        (AmazonS3ConfigKey::SecretAccessKey, &config.secret_key),
        (AmazonS3ConfigKey::Token, &config.session_token),
        (AmazonS3ConfigKey::Endpoint, &config.endpoint),
    ];

    let builder = optional.into_iter().fold(
        AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_allow_http(config.allow_http),
        |builder, (key, value)| match value {
            Some(value) => builder.with_config(key, value),
            None => builder,
        },
    );

    let store = builder
        .build()
        .with_context(|| format!("Failed to build S3 store for bucket {}", config.bucket))?;

    Ok(Arc::new(store))
}

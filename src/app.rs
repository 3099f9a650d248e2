use object_store::memory::InMemory;
use std::sync::Arc;

use crate::{
    adapters::outbound::storage::{create_s3_store, ApacheObjectStoreAdapter, S3Config},
    domain::{models::MetadataMerge, value_objects::BucketName},
    services::ObjectStore,
};

/// Bucket used when nothing is configured
pub const DEFAULT_BUCKET: &str = "local-bucket";

/// Configuration for the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bucket: String,
    pub storage_backend: StorageBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            storage_backend: StorageBackend::InMemory,
        }
    }
}

/// Storage backend configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    S3 {
        region: String,
        access_key: Option<String>,
        secret_key: Option<String>,
        session_token: Option<String>,
        endpoint: Option<String>,
    },
    MinIO {
        endpoint: String,
        access_key: String,
        secret_key: String,
        use_ssl: bool,
    },
}

impl AppConfig {
    /// Read configuration from the process environment, loading `.env` first
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| AppError::Configuration {
                message: format!("{} environment variable required", name),
            })
        };

        let storage_backend = match lookup("STORAGE_BACKEND").as_deref() {
            Some("s3") => StorageBackend::S3 {
                region: required("S3_REGION")?,
                access_key: lookup("S3_ACCESS_KEY"),
                secret_key: lookup("S3_SECRET_KEY"),
                session_token: lookup("S3_SESSION_TOKEN"),
                endpoint: lookup("S3_ENDPOINT"),
            },
            Some("minio") => StorageBackend::MinIO {
                endpoint: required("MINIO_ENDPOINT")?,
                access_key: required("MINIO_ACCESS_KEY")?,
                secret_key: required("MINIO_SECRET_KEY")?,
                use_ssl: lookup("MINIO_USE_SSL")
                    .map(|v| v.to_lowercase() == "true")
                    .unwrap_or(false),
            },
            Some("memory") | None => StorageBackend::InMemory,
            Some(other) => {
                return Err(AppError::Configuration {
                    message: format!("Unknown STORAGE_BACKEND: {}", other),
                })
            }
        };

        let bucket = match &storage_backend {
            StorageBackend::InMemory => {
                lookup("STORE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string())
            }
            _ => required("STORE_BUCKET")?,
        };

        Ok(Self {
            bucket,
            storage_backend,
        })
    }
}

/// Application builder: wires a backend and the facade from configuration
#[derive(Default)]
pub struct AppBuilder {
    config: AppConfig,
    merge: Option<Arc<dyn MetadataMerge>>,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.config.bucket = bucket.into();
        self
    }

    /// Metadata merge policy for `put_head`
    pub fn with_merge(mut self, merge: impl MetadataMerge + 'static) -> Self {
        self.merge = Some(Arc::new(merge));
        self
    }

    /// Build the backend only
    pub fn build_backend(&self) -> Result<Arc<dyn crate::ports::StorageBackend>, AppError> {
        let bucket = self.bucket()?;
        let store: Arc<dyn object_store::ObjectStore> = match &self.config.storage_backend {
            StorageBackend::InMemory => Arc::new(InMemory::new()),
            StorageBackend::S3 {
                region,
                access_key,
                secret_key,
                session_token,
                endpoint,
            } => self.create_s3(S3Config {
                bucket: bucket.to_string(),
                region: region.clone(),
                access_key: access_key.clone(),
                secret_key: secret_key.clone(),
                session_token: session_token.clone(),
                endpoint: endpoint.clone(),
                allow_http: endpoint
                    .as_deref()
                    .is_some_and(|e| e.starts_with("http://")),
            })?,
            StorageBackend::MinIO {
                endpoint,
                access_key,
                secret_key,
                use_ssl,
            } => self.create_s3(S3Config {
                bucket: bucket.to_string(),
                // MinIO ignores the region but the signer needs one
                region: "us-east-1".to_string(),
                access_key: Some(access_key.clone()),
                secret_key: Some(secret_key.clone()),
                session_token: None,
                endpoint: Some(endpoint.clone()),
                allow_http: !use_ssl,
            })?,
        };

        Ok(Arc::new(ApacheObjectStoreAdapter::new(store, bucket)))
    }

    /// Build the object store facade
    pub fn build(self) -> Result<ObjectStore, AppError> {
        let backend = self.build_backend()?;
        let store = ObjectStore::new(backend, self.bucket()?);

        Ok(match self.merge {
            Some(merge) => store.with_shared_merge(merge),
            None => store,
        })
    }

    fn bucket(&self) -> Result<BucketName, AppError> {
        BucketName::new(self.config.bucket.as_str()).map_err(|e| AppError::Configuration {
            message: e.to_string(),
        })
    }

    fn create_s3(&self, config: S3Config) -> Result<Arc<dyn object_store::ObjectStore>, AppError> {
        create_s3_store(&config).map_err(|e| AppError::StorageInit {
            message: format!("{:#}", e),
        })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },
}

/// Create an in-memory store for testing and development
pub fn create_in_memory_store() -> Result<ObjectStore, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory)
        .build()
}

/// Create a store from environment variables
pub fn create_store_from_env() -> Result<ObjectStore, AppError> {
    AppBuilder::new().with_config(AppConfig::from_env()?).build()
}

use std::sync::Arc;

use crate::domain::errors::ValidationError;

/// Errors that can occur during storage operations
#[derive(Debug, Clone)]
pub enum StorageError {
    /// Object not found
    ObjectNotFound { key: String },

    /// The backend is not bound to the requested bucket, or the bucket is absent
    BucketNotFound { bucket: String },

    /// Caller supplied an invalid key, bucket name or batch
    Validation(ValidationError),

    /// Transport, auth, permission or service-side failure.
    ///
    /// `code` is the backend's own classification; `source` keeps the
    /// original error for diagnostics.
    BackendError {
        message: String,
        code: Option<String>,
        source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    },
}

impl StorageError {
    /// Build a backend error without an underlying source
    pub fn backend(message: impl Into<String>) -> Self {
        StorageError::BackendError {
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// True for both missing objects and missing buckets
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::ObjectNotFound { .. } | StorageError::BucketNotFound { .. }
        )
    }

    /// The backend-supplied error code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            StorageError::BackendError { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::ObjectNotFound { key } => {
                write!(f, "Object not found: {}", key)
            }
            StorageError::BucketNotFound { bucket } => {
                write!(f, "Bucket not found: {}", bucket)
            }
            StorageError::Validation(err) => {
                write!(f, "Validation error: {}", err)
            }
            StorageError::BackendError { message, code, .. } => match code {
                Some(code) => write!(f, "Storage backend error [{}]: {}", code, message),
                None => write!(f, "Storage backend error: {}", message),
            },
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Validation(err) => Some(err),
            StorageError::BackendError {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::Validation(err)
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

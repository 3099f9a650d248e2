use std::sync::Arc;

use crate::domain::errors::StorageError;

/// Backend classification of an object_store error, kept as the error code
fn error_code(err: &object_store::Error) -> &'static str {
    match err {
        object_store::Error::NotFound { .. } => "NotFound",
        object_store::Error::AlreadyExists { .. } => "AlreadyExists",
        object_store::Error::Precondition { .. } => "PreconditionFailed",
        object_store::Error::NotModified { .. } => "NotModified",
        object_store::Error::PermissionDenied { .. } => "PermissionDenied",
        object_store::Error::Unauthenticated { .. } => "Unauthenticated",
        object_store::Error::NotSupported { .. } | object_store::Error::NotImplemented => {
            "NotSupported"
        }
        object_store::Error::InvalidPath { .. } => "InvalidPath",
        _ => "Generic",
    }
}

/// Convert object_store errors to domain storage errors.
///
/// Only a missing object is translated; every other failure keeps the
/// original error as its source.
impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => StorageError::ObjectNotFound { key: path },
            err => StorageError::BackendError {
                message: err.to_string(),
                code: Some(error_code(&err).to_string()),
                source: Some(Arc::new(err)),
            },
        }
    }
}

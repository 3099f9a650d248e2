pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Value objects
pub use domain::{BucketName, ObjectKey};

// Models
pub use domain::{
    blob_stream, drain_to_string, Blob, ByteStream, HeadEntry, ListOptions, Metadata,
    MetadataMerge, MetadataPatch, OverlayMerge, Payload, PutBody, DEFAULT_CHUNK_SIZE,
};

// Errors
pub use domain::{BucketNameRule, StorageError, StorageResult, ValidationError};

// Port types - the storage backend contract
pub use ports::storage::{
    CopyRequest, CopyResponse, DeleteManyRequest, DeleteManyResponse, DeleteRequest, GetRequest,
    GetResponse, HeadRequest, HeadResponse, ListRequest, ListResponse, MetadataDirective, PutMode,
    PutRequest, PutResponse, StorageBackend,
};

// The facade
pub use services::ObjectStore;

// Application factory and configuration
pub use app::{
    create_in_memory_store, create_store_from_env, AppBuilder, AppConfig, AppError,
    StorageBackend as StorageBackendConfig,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::{create_s3_store, ApacheObjectStoreAdapter, S3Config};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_store, ApacheObjectStoreAdapter, AppBuilder, BucketName, ListOptions,
        Metadata, MetadataPatch, ObjectKey, ObjectStore, Payload, StorageBackend, StorageError,
    };
}

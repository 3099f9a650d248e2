use std::ops::Range;

use async_trait::async_trait;

use crate::domain::{
    errors::{StorageError, StorageResult},
    models::{ByteStream, HeadEntry, Metadata, PutBody},
    value_objects::{BucketName, ObjectKey},
};

/// Port for the remote object storage service.
///
/// Each method is one request/response exchange with the backend. The
/// facade builds the requests; implementations only translate them.
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Fetch an object, or only its head when `request.head` is set
    async fn get(&self, request: GetRequest) -> StorageResult<GetResponse>;

    /// Write an object, replacing any existing one unless the mode forbids it
    async fn put(&self, request: PutRequest) -> StorageResult<PutResponse>;

    /// Delete a single object
    async fn delete(&self, request: DeleteRequest) -> StorageResult<()>;

    /// Delete a batch of objects in one request, reporting per-key outcomes
    async fn delete_many(&self, request: DeleteManyRequest) -> StorageResult<DeleteManyResponse>;

    /// Server-side copy within the bucket
    async fn copy(&self, request: CopyRequest) -> StorageResult<CopyResponse>;

    /// Fetch metadata without the payload
    async fn head(&self, request: HeadRequest) -> StorageResult<HeadResponse>;

    /// List a single page of objects
    async fn list(&self, request: ListRequest) -> StorageResult<ListResponse>;
}

#[derive(Debug, Clone)]
pub struct GetRequest {
    pub bucket: BucketName,
    pub key: ObjectKey,
    pub range: Option<Range<u64>>,
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub version: Option<String>,
    /// Skip the payload
    pub head: bool,
}

impl GetRequest {
    pub fn new(bucket: BucketName, key: ObjectKey) -> Self {
        Self {
            bucket,
            key,
            range: None,
            if_match: None,
            if_none_match: None,
            version: None,
            head: false,
        }
    }
}

pub struct GetResponse {
    /// `None` when the backend sent no body
    pub body: Option<ByteStream>,
    pub metadata: Metadata,
    pub entry: HeadEntry,
    pub content_type: Option<String>,
}

impl std::fmt::Debug for GetResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GetResponse")
            .field("has_body", &self.body.is_some())
            .field("metadata", &self.metadata)
            .field("entry", &self.entry)
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Write semantics for [`PutRequest`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PutMode {
    #[default]
    Overwrite,
    /// Fail if an object already exists at the key
    Create,
}

#[derive(Debug)]
pub struct PutRequest {
    pub bucket: BucketName,
    pub key: ObjectKey,
    pub body: PutBody,
    pub content_type: Option<String>,
    pub metadata: Metadata,
    pub mode: PutMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutResponse {
    pub e_tag: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub bucket: BucketName,
    pub key: ObjectKey,
}

#[derive(Debug, Clone)]
pub struct DeleteManyRequest {
    pub bucket: BucketName,
    pub keys: Vec<ObjectKey>,
}

/// Per-key outcome of a batch delete. Partial failure is not an error of
/// the request itself; callers must inspect `errors`.
#[derive(Debug, Clone, Default)]
pub struct DeleteManyResponse {
    pub deleted: Vec<String>,
    pub errors: Vec<StorageError>,
}

impl DeleteManyResponse {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// What happens to the source object's metadata during a copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MetadataDirective {
    #[default]
    Copy,
    /// Discard the source metadata and use this map instead
    Replace(Metadata),
}

#[derive(Debug, Clone)]
pub struct CopyRequest {
    pub bucket: BucketName,
    pub source_key: ObjectKey,
    pub dest_key: ObjectKey,
    pub metadata_directive: MetadataDirective,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyResponse {
    pub e_tag: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HeadRequest {
    pub bucket: BucketName,
    pub key: ObjectKey,
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HeadResponse {
    pub metadata: Metadata,
    pub entry: HeadEntry,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub bucket: BucketName,
    pub prefix: Option<String>,
    pub marker: Option<String>,
    pub max_keys: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ListResponse {
    pub entries: Vec<HeadEntry>,
    pub is_truncated: bool,
    /// Pass back as `marker` to fetch the next page
    pub next_marker: Option<String>,
}

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::{
    path::Path as ObjectPath, Attribute, Attributes, GetOptions, GetRange, ObjectMeta,
    ObjectStore as ApacheObjectStore, PutMultipartOpts, PutOptions, PutPayload, PutResult,
    UpdateVersion, WriteMultipart,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    domain::{
        errors::{StorageError, StorageResult, ValidationError},
        models::{ByteStream, HeadEntry, Metadata, PutBody},
        value_objects::{BucketName, ObjectKey},
    },
    ports::storage::{
        CopyRequest, CopyResponse, DeleteManyRequest, DeleteManyResponse, DeleteRequest,
        GetRequest, GetResponse, HeadRequest, HeadResponse, ListRequest, ListResponse,
        MetadataDirective, PutMode, PutRequest, PutResponse, StorageBackend,
    },
};

/// Upper bound on a single listing page, whatever the caller asks for
pub const MAX_LIST_KEYS: usize = 1000;

/// Parts in flight per streamed upload
const UPLOAD_CONCURRENCY: usize = 8;

/// Storage backend over an Apache `object_store` handle bound to one bucket.
///
/// Streamed payloads are written as multipart uploads, so at most a few
/// parts are buffered at a time. Create-only writes and metadata-replacing
/// self-copies need a conditional single request and are buffered whole.
#[derive(Clone)]
pub struct ApacheObjectStoreAdapter {
    inner: Arc<dyn ApacheObjectStore>,
    bucket: BucketName,
}

impl ApacheObjectStoreAdapter {
    pub fn new(store: Arc<dyn ApacheObjectStore>, bucket: BucketName) -> Self {
        Self {
            inner: store,
            bucket,
        }
    }

    pub fn bucket(&self) -> &BucketName {
        &self.bucket
    }

    fn check_bucket(&self, bucket: &BucketName) -> StorageResult<()> {
        if bucket != &self.bucket {
            return Err(StorageError::BucketNotFound {
                bucket: bucket.to_string(),
            });
        }
        Ok(())
    }

    fn to_object_path(key: &ObjectKey) -> StorageResult<ObjectPath> {
        ObjectPath::parse(key.as_str()).map_err(|err| unaddressable(key.as_str(), err))
    }

    fn to_head_entry(meta: &ObjectMeta) -> HeadEntry {
        HeadEntry {
            key: meta.location.to_string(),
            size: meta.size,
            last_modified: meta.last_modified,
            e_tag: meta.e_tag.clone(),
            version: meta.version.clone(),
        }
    }

    fn metadata_from_attributes(attributes: &Attributes) -> Metadata {
        attributes
            .iter()
            .filter_map(|(attribute, value)| match attribute {
                Attribute::Metadata(name) => Some((name.to_string(), value.to_string())),
                _ => None,
            })
            .collect()
    }

    fn content_type_from_attributes(attributes: &Attributes) -> Option<String> {
        attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string())
    }

    fn insert_metadata(attributes: &mut Attributes, metadata: Metadata) {
        for (name, value) in metadata {
            attributes.insert(Attribute::Metadata(name.into()), value.into());
        }
    }

    /// Write a stream as a multipart upload, aborting it if the stream fails
    async fn write_stream(
        &self,
        path: &ObjectPath,
        mut stream: ByteStream,
        attributes: Attributes,
    ) -> StorageResult<PutResult> {
        let options = PutMultipartOpts {
            attributes,
            ..Default::default()
        };
        let upload = self.inner.put_multipart_opts(path, options).await?;
        let mut writer = WriteMultipart::new(upload);

        loop {
            let next = match writer.wait_for_capacity(UPLOAD_CONCURRENCY).await {
                Ok(()) => stream.try_next().await,
                Err(err) => Err(err.into()),
            };
            match next {
                Ok(Some(chunk)) => writer.put(chunk),
                Ok(None) => break,
                Err(err) => {
                    if let Err(abort_err) = writer.abort().await {
                        warn!(path = %path, error = %abort_err, "failed to abort upload");
                    }
                    return Err(err);
                }
            }
        }

        Ok(writer.finish().await?)
    }

    /// Rewrite `dest` from `source` with a new metadata set.
    ///
    /// object_store has no copy-with-metadata call, so the payload is read
    /// and written back; non-metadata attributes are carried over. A
    /// self-copy is conditional on the version that was read: if another
    /// writer replaced the object in between, the write fails with
    /// `PreconditionFailed` and their payload and metadata are kept.
    async fn copy_replacing_metadata(
        &self,
        source: &ObjectPath,
        dest: &ObjectPath,
        metadata: Metadata,
    ) -> StorageResult<CopyResponse> {
        let current = self.inner.get(source).await?;

        let mut attributes = Attributes::new();
        for (attribute, value) in current.attributes.iter() {
            if !matches!(attribute, Attribute::Metadata(_)) {
                attributes.insert(attribute.clone(), value.clone());
            }
        }
        Self::insert_metadata(&mut attributes, metadata);

        let result = if source == dest {
            let mode = expected_version(&current.meta);
            let chunks: Vec<Bytes> = current.into_stream().try_collect().await?;
            debug!(
                path = %dest,
                conditional = matches!(mode, object_store::PutMode::Update(_)),
                "rewriting object in place"
            );
            let options = PutOptions {
                mode,
                attributes,
                ..Default::default()
            };
            self.inner
                .put_opts(dest, PutPayload::from_iter(chunks), options)
                .await?
        } else {
            let stream = current.into_stream().map_err(StorageError::from).boxed();
            self.write_stream(dest, stream, attributes).await?
        };

        Ok(CopyResponse {
            e_tag: result.e_tag,
            version: result.version,
        })
    }
}

/// Put mode that only succeeds while the object is still at `meta`'s version
fn expected_version(meta: &ObjectMeta) -> object_store::PutMode {
    if meta.e_tag.is_none() && meta.version.is_none() {
        return object_store::PutMode::Overwrite;
    }
    object_store::PutMode::Update(UpdateVersion {
        e_tag: meta.e_tag.clone(),
        version: meta.version.clone(),
    })
}

fn unaddressable(key: &str, err: object_store::path::Error) -> StorageError {
    ValidationError::UnaddressableObjectKey {
        key: key.to_string(),
        reason: err.to_string(),
    }
    .into()
}

#[async_trait]
impl StorageBackend for ApacheObjectStoreAdapter {
    async fn get(&self, request: GetRequest) -> StorageResult<GetResponse> {
        self.check_bucket(&request.bucket)?;
        let path = Self::to_object_path(&request.key)?;

        let options = GetOptions {
            if_match: request.if_match,
            if_none_match: request.if_none_match,
            range: request.range.map(GetRange::Bounded),
            version: request.version,
            head: request.head,
            ..Default::default()
        };
        let result = self.inner.get_opts(&path, options).await?;

        let metadata = Self::metadata_from_attributes(&result.attributes);
        let content_type = Self::content_type_from_attributes(&result.attributes);
        let entry = Self::to_head_entry(&result.meta);
        let body = if request.head {
            None
        } else {
            Some(result.into_stream().map_err(StorageError::from).boxed())
        };

        Ok(GetResponse {
            body,
            metadata,
            entry,
            content_type,
        })
    }

    async fn put(&self, request: PutRequest) -> StorageResult<PutResponse> {
        self.check_bucket(&request.bucket)?;
        let path = Self::to_object_path(&request.key)?;

        let mut attributes = Attributes::new();
        if let Some(content_type) = request.content_type {
            attributes.insert(Attribute::ContentType, content_type.into());
        }
        Self::insert_metadata(&mut attributes, request.metadata);

        let result = match (request.body, request.mode) {
            (PutBody::Stream(stream), PutMode::Overwrite) => {
                self.write_stream(&path, stream, attributes).await?
            }
            (body, mode) => {
                // Multipart uploads carry no precondition; create-only
                // streams are buffered into a single request.
                let payload = match body {
                    PutBody::Bytes(bytes) => PutPayload::from(bytes),
                    PutBody::Stream(stream) => {
                        let chunks: Vec<Bytes> = stream.try_collect().await?;
                        PutPayload::from_iter(chunks)
                    }
                };
                let options = PutOptions {
                    mode: match mode {
                        PutMode::Overwrite => object_store::PutMode::Overwrite,
                        PutMode::Create => object_store::PutMode::Create,
                    },
                    attributes,
                    ..Default::default()
                };
                self.inner.put_opts(&path, payload, options).await?
            }
        };

        Ok(PutResponse {
            e_tag: result.e_tag,
            version: result.version,
        })
    }

    async fn delete(&self, request: DeleteRequest) -> StorageResult<()> {
        self.check_bucket(&request.bucket)?;
        let path = Self::to_object_path(&request.key)?;

        self.inner.delete(&path).await?;
        Ok(())
    }

    async fn delete_many(&self, request: DeleteManyRequest) -> StorageResult<DeleteManyResponse> {
        self.check_bucket(&request.bucket)?;
        let paths = request
            .keys
            .iter()
            .map(Self::to_object_path)
            .collect::<StorageResult<Vec<_>>>()?;

        let locations = futures::stream::iter(paths.into_iter().map(Ok)).boxed();
        let outcomes: Vec<object_store::Result<ObjectPath>> =
            self.inner.delete_stream(locations).collect().await;

        let mut response = DeleteManyResponse::default();
        for outcome in outcomes {
            match outcome {
                Ok(path) => response.deleted.push(path.to_string()),
                Err(err) => response.errors.push(err.into()),
            }
        }
        Ok(response)
    }

    async fn copy(&self, request: CopyRequest) -> StorageResult<CopyResponse> {
        self.check_bucket(&request.bucket)?;
        let source = Self::to_object_path(&request.source_key)?;
        let dest = Self::to_object_path(&request.dest_key)?;

        match request.metadata_directive {
            MetadataDirective::Copy => {
                self.inner.copy(&source, &dest).await?;
                Ok(CopyResponse::default())
            }
            MetadataDirective::Replace(metadata) => {
                self.copy_replacing_metadata(&source, &dest, metadata).await
            }
        }
    }

    async fn head(&self, request: HeadRequest) -> StorageResult<HeadResponse> {
        self.check_bucket(&request.bucket)?;
        let path = Self::to_object_path(&request.key)?;

        let options = GetOptions {
            version: request.version,
            head: true,
            ..Default::default()
        };
        let result = self.inner.get_opts(&path, options).await?;

        Ok(HeadResponse {
            metadata: Self::metadata_from_attributes(&result.attributes),
            entry: Self::to_head_entry(&result.meta),
            content_type: Self::content_type_from_attributes(&result.attributes),
        })
    }

    async fn list(&self, request: ListRequest) -> StorageResult<ListResponse> {
        self.check_bucket(&request.bucket)?;

        let page_size = request
            .max_keys
            .unwrap_or(MAX_LIST_KEYS)
            .min(MAX_LIST_KEYS);
        let prefix = request.prefix.unwrap_or_default();

        // object_store lists by whole path segments; narrow to the
        // enclosing directory and match the raw prefix below. Paths are
        // parsed, not encoded, so they compare like the stored keys.
        let directory = match prefix.rfind('/') {
            Some(idx) => match ObjectPath::parse(&prefix[..idx]) {
                Ok(directory) => Some(directory),
                // no stored key lives under an unparseable directory
                Err(_) => return Ok(ListResponse::default()),
            },
            None => None,
        };
        let marker = request.marker;
        let offset = marker
            .as_deref()
            .and_then(|marker| ObjectPath::parse(marker).ok());

        let mut stream = match &offset {
            Some(offset) => self.inner.list_with_offset(directory.as_ref(), offset),
            None => self.inner.list(directory.as_ref()),
        };

        let mut entries = Vec::new();
        let mut is_truncated = false;
        while let Some(meta) = stream.try_next().await? {
            let key = meta.location.as_ref();
            if !key.starts_with(prefix.as_str()) {
                continue;
            }
            if marker.as_deref().is_some_and(|marker| key <= marker) {
                continue;
            }
            if entries.len() >= page_size {
                is_truncated = true;
                break;
            }
            entries.push(Self::to_head_entry(&meta));
        }

        let next_marker = if is_truncated {
            entries.last().map(|entry: &HeadEntry| entry.key.clone())
        } else {
            None
        };

        Ok(ListResponse {
            entries,
            is_truncated,
            next_marker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{drain_to_string, Payload};
    use futures::stream::BoxStream;
    use object_store::{memory::InMemory, GetResult, ListResult, MultipartUpload};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Lands a competing write right after the first full read
    #[derive(Debug, Default)]
    struct RacingStore {
        inner: InMemory,
        raced: AtomicBool,
    }

    impl std::fmt::Display for RacingStore {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "RacingStore({})", self.inner)
        }
    }

    #[async_trait]
    impl ApacheObjectStore for RacingStore {
        async fn put_opts(
            &self,
            location: &ObjectPath,
            payload: PutPayload,
            opts: PutOptions,
        ) -> object_store::Result<PutResult> {
            self.inner.put_opts(location, payload, opts).await
        }

        async fn put_multipart_opts(
            &self,
            location: &ObjectPath,
            opts: PutMultipartOpts,
        ) -> object_store::Result<Box<dyn MultipartUpload>> {
            self.inner.put_multipart_opts(location, opts).await
        }

        async fn get_opts(
            &self,
            location: &ObjectPath,
            options: GetOptions,
        ) -> object_store::Result<GetResult> {
            let head = options.head;
            let result = self.inner.get_opts(location, options).await?;
            if !head && !self.raced.swap(true, Ordering::SeqCst) {
                self.inner
                    .put(location, PutPayload::from_static(b"concurrent"))
                    .await?;
            }
            Ok(result)
        }

        async fn delete(&self, location: &ObjectPath) -> object_store::Result<()> {
            self.inner.delete(location).await
        }

        fn list(
            &self,
            prefix: Option<&ObjectPath>,
        ) -> BoxStream<'static, object_store::Result<ObjectMeta>> {
            self.inner.list(prefix)
        }

        async fn list_with_delimiter(
            &self,
            prefix: Option<&ObjectPath>,
        ) -> object_store::Result<ListResult> {
            self.inner.list_with_delimiter(prefix).await
        }

        async fn copy(&self, from: &ObjectPath, to: &ObjectPath) -> object_store::Result<()> {
            self.inner.copy(from, to).await
        }

        async fn copy_if_not_exists(
            &self,
            from: &ObjectPath,
            to: &ObjectPath,
        ) -> object_store::Result<()> {
            self.inner.copy_if_not_exists(from, to).await
        }
    }

    fn adapter() -> ApacheObjectStoreAdapter {
        ApacheObjectStoreAdapter::new(
            Arc::new(InMemory::new()),
            BucketName::new("test-bucket").unwrap(),
        )
    }

    fn key(value: &str) -> ObjectKey {
        ObjectKey::new(value).unwrap()
    }

    async fn put(adapter: &ApacheObjectStoreAdapter, name: &str, metadata: Metadata) {
        adapter
            .put(PutRequest {
                bucket: adapter.bucket().clone(),
                key: key(name),
                body: Payload::from(name).normalize(),
                content_type: Some("text/plain".to_string()),
                metadata,
                mode: PutMode::Overwrite,
            })
            .await
            .unwrap();
    }

    fn list_request(adapter: &ApacheObjectStoreAdapter) -> ListRequest {
        ListRequest {
            bucket: adapter.bucket().clone(),
            prefix: None,
            marker: None,
            max_keys: None,
        }
    }

    #[tokio::test]
    async fn test_put_then_head_returns_metadata() {
        let adapter = adapter();
        let metadata = Metadata::from([("owner".to_string(), "alice".to_string())]);
        put(&adapter, "docs/a.txt", metadata.clone()).await;

        let head = adapter
            .head(HeadRequest {
                bucket: adapter.bucket().clone(),
                key: key("docs/a.txt"),
                version: None,
            })
            .await
            .unwrap();

        assert_eq!(head.metadata, metadata);
        assert_eq!(head.content_type.as_deref(), Some("text/plain"));
        assert_eq!(head.entry.key, "docs/a.txt");
        assert_eq!(head.entry.size, "docs/a.txt".len() as u64);
    }

    #[tokio::test]
    async fn test_get_head_request_has_no_body() {
        let adapter = adapter();
        put(&adapter, "a.txt", Metadata::new()).await;

        let mut request = GetRequest::new(adapter.bucket().clone(), key("a.txt"));
        request.head = true;

        let response = adapter.get(request).await.unwrap();
        assert!(response.body.is_none());
    }

    #[tokio::test]
    async fn test_copy_replace_swaps_metadata() {
        let adapter = adapter();
        put(
            &adapter,
            "a.txt",
            Metadata::from([("old".to_string(), "1".to_string())]),
        )
        .await;

        let replacement = Metadata::from([("new".to_string(), "2".to_string())]);
        adapter
            .copy(CopyRequest {
                bucket: adapter.bucket().clone(),
                source_key: key("a.txt"),
                dest_key: key("a.txt"),
                metadata_directive: MetadataDirective::Replace(replacement.clone()),
            })
            .await
            .unwrap();

        let response = adapter
            .get(GetRequest::new(adapter.bucket().clone(), key("a.txt")))
            .await
            .unwrap();
        assert_eq!(response.metadata, replacement);
        assert_eq!(response.content_type.as_deref(), Some("text/plain"));

        let body = drain_to_string(response.body.unwrap())
            .await
            .unwrap();
        assert_eq!(body, "a.txt");
    }

    #[tokio::test]
    async fn test_list_applies_raw_prefix() {
        let adapter = adapter();
        for name in ["logs/app-1", "logs/app-2", "logs/db-1", "other"] {
            put(&adapter, name, Metadata::new()).await;
        }

        let mut request = list_request(&adapter);
        request.prefix = Some("logs/app".to_string());
        let response = adapter.list(request).await.unwrap();

        let keys: Vec<_> = response.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["logs/app-1", "logs/app-2"]);
        assert!(!response.is_truncated);
        assert_eq!(response.next_marker, None);
    }

    #[tokio::test]
    async fn test_list_pages_with_marker() {
        let adapter = adapter();
        for name in ["k1", "k2", "k3", "k4", "k5"] {
            put(&adapter, name, Metadata::new()).await;
        }

        let mut request = list_request(&adapter);
        request.max_keys = Some(2);
        let first = adapter.list(request.clone()).await.unwrap();
        assert_eq!(first.entries.len(), 2);
        assert!(first.is_truncated);
        assert_eq!(first.next_marker.as_deref(), Some("k2"));

        request.marker = first.next_marker;
        let second = adapter.list(request).await.unwrap();
        let keys: Vec<_> = second.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["k3", "k4"]);
    }

    #[tokio::test]
    async fn test_list_page_size_is_capped() {
        let adapter = adapter();
        for i in 0..(MAX_LIST_KEYS + 5) {
            put(&adapter, &format!("bulk/{:05}", i), Metadata::new()).await;
        }

        let mut request = list_request(&adapter);
        request.max_keys = Some(MAX_LIST_KEYS * 10);
        let response = adapter.list(request).await.unwrap();

        assert_eq!(response.entries.len(), MAX_LIST_KEYS);
        assert!(response.is_truncated);
    }

    #[tokio::test]
    async fn test_delete_many_reports_deleted_keys() {
        let adapter = adapter();
        put(&adapter, "a", Metadata::new()).await;
        put(&adapter, "b", Metadata::new()).await;

        let response = adapter
            .delete_many(DeleteManyRequest {
                bucket: adapter.bucket().clone(),
                keys: vec![key("a"), key("b")],
            })
            .await
            .unwrap();

        assert!(response.is_complete());
        let mut deleted = response.deleted.clone();
        deleted.sort();
        assert_eq!(deleted, vec!["a", "b"]);

        let listing = adapter.list(list_request(&adapter)).await.unwrap();
        assert!(listing.entries.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_foreign_bucket() {
        let adapter = adapter();

        let err = adapter
            .head(HeadRequest {
                bucket: BucketName::new("someone-else").unwrap(),
                key: key("a.txt"),
                version: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::BucketNotFound { bucket } if bucket == "someone-else"));
    }

    #[tokio::test]
    async fn test_create_mode_refuses_overwrite() {
        let adapter = adapter();
        put(&adapter, "once.txt", Metadata::new()).await;

        let err = adapter
            .put(PutRequest {
                bucket: adapter.bucket().clone(),
                key: key("once.txt"),
                body: Payload::from("again").normalize(),
                content_type: None,
                metadata: Metadata::new(),
                mode: PutMode::Create,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some("AlreadyExists"));
    }

    async fn read_all(adapter: &ApacheObjectStoreAdapter, name: &str) -> Vec<u8> {
        let response = adapter
            .get(GetRequest::new(adapter.bucket().clone(), key(name)))
            .await
            .unwrap();
        let chunks: Vec<Bytes> = response.body.unwrap().try_collect().await.unwrap();
        chunks.concat()
    }

    fn listed_keys(response: &ListResponse) -> Vec<&str> {
        response.entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_prefix_keeps_special_characters() {
        let adapter = adapter();
        for name in ["dir#1/a", "dir#1/b", "dir#1/c", "x%y", "a{b}"] {
            put(&adapter, name, Metadata::new()).await;
        }

        let mut request = list_request(&adapter);
        request.prefix = Some("dir#1/".to_string());
        let response = adapter.list(request).await.unwrap();

        assert_eq!(listed_keys(&response), vec!["dir#1/a", "dir#1/b", "dir#1/c"]);
    }

    #[tokio::test]
    async fn test_marker_with_special_characters_resumes_after_key() {
        let adapter = adapter();
        for name in ["dir#1/a", "dir#1/b", "dir#1/c", "x%y", "a{b}"] {
            put(&adapter, name, Metadata::new()).await;
        }

        let mut request = list_request(&adapter);
        request.marker = Some("dir#1/a".to_string());
        let response = adapter.list(request).await.unwrap();
        assert_eq!(listed_keys(&response), vec!["dir#1/b", "dir#1/c", "x%y"]);

        // walk every page one key at a time
        let mut request = list_request(&adapter);
        request.max_keys = Some(1);
        let mut seen = Vec::new();
        loop {
            let page = adapter.list(request.clone()).await.unwrap();
            seen.extend(page.entries.iter().map(|e| e.key.clone()));
            if !page.is_truncated {
                break;
            }
            request.marker = page.next_marker;
        }
        assert_eq!(seen, vec!["a{b}", "dir#1/a", "dir#1/b", "dir#1/c", "x%y"]);
    }

    #[tokio::test]
    async fn test_streamed_put_spans_multiple_parts() {
        let adapter = adapter();
        let data: Vec<u8> = (0..6 * 1024 * 1024).map(|i| (i % 251) as u8).collect();

        adapter
            .put(PutRequest {
                bucket: adapter.bucket().clone(),
                key: key("big.bin"),
                body: Payload::from_blob(Bytes::from(data.clone())).normalize(),
                content_type: Some("application/octet-stream".to_string()),
                metadata: Metadata::from([("kind".to_string(), "bulk".to_string())]),
                mode: PutMode::Overwrite,
            })
            .await
            .unwrap();

        let head = adapter
            .head(HeadRequest {
                bucket: adapter.bucket().clone(),
                key: key("big.bin"),
                version: None,
            })
            .await
            .unwrap();
        assert_eq!(head.entry.size, data.len() as u64);
        assert_eq!(head.metadata.get("kind").map(String::as_str), Some("bulk"));
        assert_eq!(
            head.content_type.as_deref(),
            Some("application/octet-stream")
        );
        assert!(read_all(&adapter, "big.bin").await == data);
    }

    #[tokio::test]
    async fn test_failed_stream_leaves_no_object() {
        let adapter = adapter();
        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(StorageError::backend("source went away")),
        ])
        .boxed();

        let err = adapter
            .put(PutRequest {
                bucket: adapter.bucket().clone(),
                key: key("broken.bin"),
                body: PutBody::Stream(stream),
                content_type: None,
                metadata: Metadata::new(),
                mode: PutMode::Overwrite,
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), StorageError::backend("source went away").to_string());
        let listing = adapter.list(list_request(&adapter)).await.unwrap();
        assert!(listing.entries.is_empty());
    }

    #[tokio::test]
    async fn test_self_copy_does_not_clobber_concurrent_write() {
        let adapter = ApacheObjectStoreAdapter::new(
            Arc::new(RacingStore::default()),
            BucketName::new("test-bucket").unwrap(),
        );
        put(
            &adapter,
            "a.txt",
            Metadata::from([("owner".to_string(), "alice".to_string())]),
        )
        .await;

        let err = adapter
            .copy(CopyRequest {
                bucket: adapter.bucket().clone(),
                source_key: key("a.txt"),
                dest_key: key("a.txt"),
                metadata_directive: MetadataDirective::Replace(Metadata::from([(
                    "owner".to_string(),
                    "bob".to_string(),
                )])),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some("PreconditionFailed"));
        assert_eq!(read_all(&adapter, "a.txt").await, b"concurrent");
    }

    #[tokio::test]
    async fn test_replace_copy_to_other_key_keeps_source() {
        let adapter = adapter();
        put(
            &adapter,
            "src.txt",
            Metadata::from([("owner".to_string(), "alice".to_string())]),
        )
        .await;

        let replacement = Metadata::from([("owner".to_string(), "bob".to_string())]);
        adapter
            .copy(CopyRequest {
                bucket: adapter.bucket().clone(),
                source_key: key("src.txt"),
                dest_key: key("dst.txt"),
                metadata_directive: MetadataDirective::Replace(replacement.clone()),
            })
            .await
            .unwrap();

        let dest = adapter
            .get(GetRequest::new(adapter.bucket().clone(), key("dst.txt")))
            .await
            .unwrap();
        assert_eq!(dest.metadata, replacement);
        assert_eq!(dest.content_type.as_deref(), Some("text/plain"));
        assert_eq!(drain_to_string(dest.body.unwrap()).await.unwrap(), "src.txt");

        let source = adapter
            .head(HeadRequest {
                bucket: adapter.bucket().clone(),
                key: key("src.txt"),
                version: None,
            })
            .await
            .unwrap();
        assert_eq!(source.metadata.get("owner").map(String::as_str), Some("alice"));
    }

    #[test]
    fn test_unaddressable_path_is_a_validation_error() {
        let err = unaddressable("a/../b", ObjectPath::parse("a/../b").unwrap_err());

        assert!(matches!(
            err,
            StorageError::Validation(ValidationError::UnaddressableObjectKey { ref key, .. })
                if key == "a/../b"
        ));
    }
}

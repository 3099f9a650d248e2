use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    domain::{
        errors::{StorageResult, ValidationError},
        models::{
            drain_to_string, ByteStream, HeadEntry, ListOptions, Metadata, MetadataMerge,
            MetadataPatch, OverlayMerge, Payload,
        },
        value_objects::{BucketName, ObjectKey},
    },
    ports::storage::{
        CopyRequest, CopyResponse, DeleteManyRequest, DeleteManyResponse, DeleteRequest,
        GetRequest, GetResponse, HeadRequest, HeadResponse, ListRequest, ListResponse,
        MetadataDirective, PutMode, PutRequest, PutResponse, StorageBackend,
    },
};

/// Bucket-scoped facade over a [`StorageBackend`].
///
/// Holds no mutable state; clones share the backend handle and can be used
/// concurrently. Multi-step operations (`rename`, `put_head`) are not atomic
/// and are never rolled back.
#[derive(Clone)]
pub struct ObjectStore {
    backend: Arc<dyn StorageBackend>,
    bucket: BucketName,
    merge: Arc<dyn MetadataMerge>,
}

impl ObjectStore {
    /// Create a store using the default overlay merge for `put_head`
    pub fn new(backend: Arc<dyn StorageBackend>, bucket: BucketName) -> Self {
        Self {
            backend,
            bucket,
            merge: Arc::new(OverlayMerge),
        }
    }

    /// Replace the merge policy used by `put_head`
    pub fn with_merge(self, merge: impl MetadataMerge + 'static) -> Self {
        self.with_shared_merge(Arc::new(merge))
    }

    pub fn with_shared_merge(mut self, merge: Arc<dyn MetadataMerge>) -> Self {
        self.merge = merge;
        self
    }

    pub fn bucket(&self) -> &BucketName {
        &self.bucket
    }

    fn key(key: &str) -> StorageResult<ObjectKey> {
        Ok(ObjectKey::new(key)?)
    }

    /// Fetch an object with the backend response untouched
    pub async fn get_raw(&self, key: &str) -> StorageResult<GetResponse> {
        self.get_raw_with(key, |_| {}).await
    }

    /// Like [`get_raw`](Self::get_raw), letting `overrides` adjust the request
    #[tracing::instrument(name = "store.get", skip_all, fields(bucket = %self.bucket, key = %key))]
    pub async fn get_raw_with<F>(&self, key: &str, overrides: F) -> StorageResult<GetResponse>
    where
        F: FnOnce(&mut GetRequest) + Send,
    {
        let mut request = GetRequest::new(self.bucket.clone(), Self::key(key)?);
        overrides(&mut request);
        self.backend.get(request).await
    }

    /// The payload stream, or `None` when the backend sent no body
    pub async fn get(&self, key: &str) -> StorageResult<Option<ByteStream>> {
        Ok(self.get_raw(key).await?.body)
    }

    /// Drain the payload and decode it as UTF-8; no body reads as ""
    pub async fn get_text(&self, key: &str) -> StorageResult<String> {
        match self.get(key).await? {
            Some(body) => drain_to_string(body).await,
            None => Ok(String::new()),
        }
    }

    /// Write an object, replacing whatever is at `key`
    pub async fn put(&self, key: &str, data: impl Into<Payload>) -> StorageResult<PutResponse> {
        self.put_with(key, data, |_| {}).await
    }

    /// Like [`put`](Self::put), letting `overrides` set content type,
    /// initial metadata or create-only mode
    #[tracing::instrument(name = "store.put", skip_all, fields(bucket = %self.bucket, key = %key))]
    pub async fn put_with<F>(
        &self,
        key: &str,
        data: impl Into<Payload>,
        overrides: F,
    ) -> StorageResult<PutResponse>
    where
        F: FnOnce(&mut PutRequest) + Send,
    {
        let key = Self::key(key)?;
        let payload = data.into();
        debug!(payload = ?payload, "writing object");

        let mut request = PutRequest {
            bucket: self.bucket.clone(),
            key,
            body: payload.normalize(),
            content_type: None,
            metadata: Metadata::new(),
            mode: PutMode::Overwrite,
        };
        overrides(&mut request);
        self.backend.put(request).await
    }

    #[tracing::instrument(name = "store.delete", skip_all, fields(bucket = %self.bucket, key = %key))]
    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        let request = DeleteRequest {
            bucket: self.bucket.clone(),
            key: Self::key(key)?,
        };
        self.backend.delete(request).await
    }

    /// Delete several keys in one backend request.
    ///
    /// Per-key failures are reported in the response, not as an error;
    /// duplicate keys are passed through as given.
    #[tracing::instrument(name = "store.delete_many", skip_all, fields(bucket = %self.bucket))]
    pub async fn delete_many<I, K>(&self, keys: I) -> StorageResult<DeleteManyResponse>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys = keys
            .into_iter()
            .map(|key| Self::key(key.as_ref()))
            .collect::<StorageResult<Vec<_>>>()?;
        if keys.is_empty() {
            return Err(ValidationError::EmptyKeyBatch.into());
        }

        let response = self
            .backend
            .delete_many(DeleteManyRequest {
                bucket: self.bucket.clone(),
                keys,
            })
            .await?;

        if !response.is_complete() {
            warn!(
                failed = response.errors.len(),
                deleted = response.deleted.len(),
                "batch delete partially failed"
            );
        }
        Ok(response)
    }

    /// Server-side copy from `old_key` to `new_key`
    pub async fn copy_raw(&self, old_key: &str, new_key: &str) -> StorageResult<CopyResponse> {
        self.copy_raw_with(old_key, new_key, |_| {}).await
    }

    #[tracing::instrument(name = "store.copy", skip_all, fields(bucket = %self.bucket, from = %old_key, to = %new_key))]
    pub async fn copy_raw_with<F>(
        &self,
        old_key: &str,
        new_key: &str,
        overrides: F,
    ) -> StorageResult<CopyResponse>
    where
        F: FnOnce(&mut CopyRequest) + Send,
    {
        let mut request = CopyRequest {
            bucket: self.bucket.clone(),
            source_key: Self::key(old_key)?,
            dest_key: Self::key(new_key)?,
            metadata_directive: MetadataDirective::Copy,
        };
        overrides(&mut request);
        self.backend.copy(request).await
    }

    /// Move an object by copying it and deleting the original.
    ///
    /// Renaming a key to itself issues no requests. If the delete fails the
    /// object exists under both keys and the delete error is returned.
    #[tracing::instrument(name = "store.rename", skip_all, fields(bucket = %self.bucket, from = %old_key, to = %new_key))]
    pub async fn rename(&self, old_key: &str, new_key: &str) -> StorageResult<()> {
        let source = Self::key(old_key)?;
        let dest = Self::key(new_key)?;
        if source == dest {
            return Ok(());
        }

        self.copy_raw(source.as_str(), dest.as_str()).await?;
        if let Err(err) = self.delete(source.as_str()).await {
            warn!(error = %err, "rename copied object but could not delete the source");
            return Err(err);
        }
        Ok(())
    }

    #[tracing::instrument(name = "store.head", skip_all, fields(bucket = %self.bucket, key = %key))]
    pub async fn get_head_raw(&self, key: &str) -> StorageResult<HeadResponse> {
        let request = HeadRequest {
            bucket: self.bucket.clone(),
            key: Self::key(key)?,
            version: None,
        };
        self.backend.head(request).await
    }

    /// The object's metadata; an object without metadata yields an empty map
    pub async fn get_head(&self, key: &str) -> StorageResult<Metadata> {
        Ok(self.get_head_raw(key).await?.metadata)
    }

    /// One page of listing. Does not follow `is_truncated`.
    #[tracing::instrument(name = "store.list", skip_all, fields(bucket = %self.bucket, prefix = ?options.prefix))]
    pub async fn get_heads_raw(&self, options: ListOptions) -> StorageResult<ListResponse> {
        let request = ListRequest {
            bucket: self.bucket.clone(),
            prefix: options.prefix,
            marker: options.marker,
            max_keys: options.limit,
        };
        self.backend.list(request).await
    }

    pub async fn get_heads(&self, options: ListOptions) -> StorageResult<Vec<HeadEntry>> {
        Ok(self.get_heads_raw(options).await?.entries)
    }

    /// Patch an object's metadata, keeping its payload.
    ///
    /// Reads the current metadata, merges the patch into it and self-copies
    /// the object with the merged map as its complete metadata. The read and
    /// the copy are separate requests, so a concurrent metadata change made
    /// between them can be overwritten (lost update).
    ///
    /// How the copy moves the payload is up to the backend. The
    /// `object_store` adapter has no server-side metadata copy: it reads the
    /// payload back and rewrites it with a write conditional on the version
    /// it read. If another writer replaced the object in the meantime, the
    /// copy fails with a `PreconditionFailed` backend error and the object
    /// keeps the other writer's payload and metadata.
    #[tracing::instrument(name = "store.put_head", skip_all, fields(bucket = %self.bucket, key = %key))]
    pub async fn put_head(
        &self,
        key: &str,
        patch: impl Into<MetadataPatch>,
    ) -> StorageResult<CopyResponse> {
        let key = Self::key(key)?;
        let patch: MetadataPatch = patch.into();
        let current = self.get_head(key.as_str()).await?;
        let merged = self.merge.merge(&current, &patch.into_metadata());
        debug!(
            before = current.len(),
            after = merged.len(),
            "replacing object metadata"
        );

        self.copy_raw_with(key.as_str(), key.as_str(), move |request| {
            request.metadata_directive = MetadataDirective::Replace(merged);
        })
        .await
        .inspect_err(|err| warn!(error = %err, "metadata copy failed; previous metadata kept"))
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

//! Payload shapes accepted on write and helpers for the byte streams read back.
//!
//! Everything written goes through [`Payload::normalize`], which leaves bytes
//! and streams alone and turns blobs into a lazy chunked stream.

use std::ops::Range;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::domain::errors::{StorageError, StorageResult};

/// Chunk size used when a blob is converted to a stream
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Single-consumer stream of payload bytes
pub type ByteStream = BoxStream<'static, StorageResult<Bytes>>;

/// Binary data of known size that can be read a slice at a time
#[async_trait]
pub trait Blob: Send + Sync + 'static {
    /// Total size in bytes
    fn size(&self) -> u64;

    /// Read the bytes in `range`, which always lies within `0..size()`
    async fn read_chunk(&self, range: Range<u64>) -> StorageResult<Bytes>;
}

#[async_trait]
impl Blob for Bytes {
    fn size(&self) -> u64 {
        self.len() as u64
    }

    async fn read_chunk(&self, range: Range<u64>) -> StorageResult<Bytes> {
        Ok(self.slice(range.start as usize..range.end as usize))
    }
}

/// Turn a blob into a lazy stream of `chunk_size` slices.
///
/// Each poll reads exactly one chunk; the stream ends once the offset reaches
/// the blob size. A chunk size of zero is treated as one.
pub fn blob_stream(blob: Arc<dyn Blob>, chunk_size: usize) -> ByteStream {
    let chunk_size = chunk_size.max(1) as u64;

    futures::stream::try_unfold(0u64, move |offset| {
        let blob = Arc::clone(&blob);
        async move {
            let size = blob.size();
            if offset >= size {
                return Ok::<_, StorageError>(None);
            }
            let end = offset.saturating_add(chunk_size).min(size);
            let chunk = blob.read_chunk(offset..end).await?;
            Ok(Some((chunk, end)))
        }
    })
    .boxed()
}

/// Drain a stream to completion and decode it as UTF-8.
///
/// Invalid sequences are replaced rather than rejected.
pub async fn drain_to_string(stream: ByteStream) -> StorageResult<String> {
    let buffer = stream
        .try_fold(BytesMut::new(), |mut buffer, chunk| async move {
            buffer.extend_from_slice(&chunk);
            Ok(buffer)
        })
        .await?;

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Data accepted by a write
pub enum Payload {
    Bytes(Bytes),
    Stream(ByteStream),
    Blob(Arc<dyn Blob>),
}

/// A payload after normalization, ready for the backend
pub enum PutBody {
    Bytes(Bytes),
    Stream(ByteStream),
}

impl Payload {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = StorageResult<Bytes>> + Send + 'static,
    {
        Payload::Stream(stream.boxed())
    }

    pub fn from_blob(blob: impl Blob) -> Self {
        Payload::Blob(Arc::new(blob))
    }

    /// Read the payload from an async reader until EOF
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        let stream = ReaderStream::new(reader).map_err(|err| StorageError::BackendError {
            message: format!("Failed to read payload: {}", err),
            code: Some("PayloadRead".to_string()),
            source: Some(Arc::new(err)),
        });
        Payload::from_stream(stream)
    }

    /// Normalize with the default blob chunk size
    pub fn normalize(self) -> PutBody {
        self.normalize_with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    pub fn normalize_with_chunk_size(self, chunk_size: usize) -> PutBody {
        match self {
            Payload::Bytes(bytes) => PutBody::Bytes(bytes),
            Payload::Stream(stream) => PutBody::Stream(stream),
            Payload::Blob(blob) => PutBody::Stream(blob_stream(blob, chunk_size)),
        }
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Payload::Stream(_) => f.write_str("Stream"),
            Payload::Blob(blob) => f.debug_tuple("Blob").field(&blob.size()).finish(),
        }
    }
}

impl std::fmt::Debug for PutBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PutBody::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            PutBody::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Bytes(Bytes::from(text))
    }
}

impl From<BytesMut> for Payload {
    fn from(buffer: BytesMut) -> Self {
        Payload::Bytes(buffer.freeze())
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for Payload {
    fn from(bytes: &[u8; N]) -> Self {
        Payload::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Bytes(Bytes::copy_from_slice(text.as_bytes()))
    }
}

impl From<ByteStream> for Payload {
    fn from(stream: ByteStream) -> Self {
        Payload::Stream(stream)
    }
}

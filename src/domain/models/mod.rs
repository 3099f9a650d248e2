pub mod head;
pub mod metadata;
pub mod payload;

pub use head::{HeadEntry, ListOptions};
pub use metadata::{Metadata, MetadataMerge, MetadataPatch, OverlayMerge};
pub use payload::{
    blob_stream, drain_to_string, Blob, ByteStream, Payload, PutBody, DEFAULT_CHUNK_SIZE,
};

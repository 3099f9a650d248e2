pub mod storage;

pub use storage::StorageBackend;

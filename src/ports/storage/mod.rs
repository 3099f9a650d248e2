mod backend;

pub use backend::{
    CopyRequest, CopyResponse, DeleteManyRequest, DeleteManyResponse, DeleteRequest, GetRequest,
    GetResponse, HeadRequest, HeadResponse, ListRequest, ListResponse, MetadataDirective,
    PutMode, PutRequest, PutResponse, StorageBackend,
};

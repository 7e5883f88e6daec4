//! Wallet storage on top of the rocksdb [`Executor`](rstdev_storage::engine::rocksdb::executor::Executor)
//!
//! Records live under `<type>:<id>` keys. Ordered lists are buckets stored under keys
//! prefixed with [`MERGE_KEY_PREFIX`] and grown through the bucket merge operator.
mod types;
pub use types::DbError;

mod bucket;
pub use bucket::Bucket;

mod merge;
pub use merge::{merge_bucket, MERGE_BUCKET_ID, MERGE_KEY_PREFIX};

mod store;
pub use store::Store;

mod builder;
pub use builder::Builder;

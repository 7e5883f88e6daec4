use rst_common::standard::serde_json::Value;

use rstdev_storage::engine::rocksdb::lib::rust_rocksdb::merge_operator::MergeOperands;

use super::{Bucket, DbError};

pub const MERGE_BUCKET_ID: &str = "merge_bucket";

/// Keys starting with this prefix hold a [`Bucket`] and accept merge operands
pub const MERGE_KEY_PREFIX: &str = "merge_";

fn parse_bucket(bytes: &[u8]) -> Option<Bucket<Value>> {
    let bucket: Result<Bucket<Value>, DbError> = bytes.to_vec().try_into();
    bucket.ok()
}

/// `merge_bucket` is an associative operator: the existing value and every operand are
/// buckets, merging appends the operand items in order
///
/// Partial merges run through the same function, their output is itself a bucket so it
/// can be merged again
pub fn merge_bucket(
    new_key: &[u8],
    existing: Option<&[u8]>,
    operands: &MergeOperands,
) -> Option<Vec<u8>> {
    let is_bucket_key = std::str::from_utf8(new_key)
        .map(|key| key.starts_with(MERGE_KEY_PREFIX))
        .unwrap_or(false);

    if !is_bucket_key {
        return existing.map(|val| val.to_vec());
    }

    let mut bucket = match existing {
        Some(val) => parse_bucket(val)?,
        None => Bucket::new(),
    };

    for op in operands {
        if let Some(op_bucket) = parse_bucket(op) {
            bucket.extend(op_bucket);
        }
    }

    let output: Result<Vec<u8>, DbError> = bucket.try_into();
    output.ok()
}

use rst_common::standard::serde::de::DeserializeOwned;
use rst_common::standard::serde::Serialize;

use rstdev_storage::engine::rocksdb::executor::Executor;
use rstdev_storage::engine::rocksdb::types::{Instruction, OutputOpts};

use super::{Bucket, DbError};

/// `Store` is a thin typed layer over the [`Executor`] instructions shared by all
/// wallet repositories
#[derive(Clone)]
pub struct Store {
    db: Executor,
}

impl Store {
    pub fn new(db: Executor) -> Self {
        Self { db }
    }

    pub async fn put(&self, key: String, value: Vec<u8>) -> Result<(), DbError> {
        let _ = self
            .db
            .exec(Instruction::SaveCf { key, value })
            .await
            .map_err(|err| DbError::InstructionError(err.to_string()))?;

        Ok(())
    }

    pub async fn get(&self, key: String) -> Result<Option<Vec<u8>>, DbError> {
        let output = self
            .db
            .exec(Instruction::GetCf { key })
            .await
            .map_err(|err| DbError::InstructionError(err.to_string()))?;

        match output {
            OutputOpts::SingleByte { value } => Ok(value),
            _ => Err(DbError::OutputError("expected a single value".to_string())),
        }
    }

    /// `multi_get` keeps the order of the given keys, missing values are `None` and the first
    /// unreadable value fails the whole read
    pub async fn multi_get(&self, keys: Vec<String>) -> Result<Vec<Option<Vec<u8>>>, DbError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let output = self
            .db
            .exec(Instruction::MultiGetCf { keys })
            .await
            .map_err(|err| DbError::InstructionError(err.to_string()))?;

        match output {
            OutputOpts::MultiBytes { values } => values
                .into_iter()
                .map(|val| val.map_err(|err| DbError::ReadError(err.to_string())))
                .collect(),
            _ => Err(DbError::OutputError("expected multiple values".to_string())),
        }
    }

    /// `multi_get_existing` reads keys taken from an index, every one of them must be present
    pub async fn multi_get_existing(&self, keys: Vec<String>) -> Result<Vec<Vec<u8>>, DbError> {
        let values = self.multi_get(keys.clone()).await?;

        keys.into_iter()
            .zip(values)
            .map(|(key, value)| value.ok_or(DbError::MissingValue(key)))
            .collect()
    }

    pub async fn remove(&self, key: String) -> Result<(), DbError> {
        let _ = self
            .db
            .exec(Instruction::RemoveCf { key })
            .await
            .map_err(|err| DbError::InstructionError(err.to_string()))?;

        Ok(())
    }

    /// `append` adds one item at the end of the bucket stored under `key`, the key must
    /// carry the merge prefix
    pub async fn append<T>(&self, key: String, item: T) -> Result<(), DbError>
    where
        T: Serialize + DeserializeOwned,
    {
        let value: Vec<u8> = Bucket::single(item).try_into()?;
        let _ = self
            .db
            .exec(Instruction::MergeCf { key, value })
            .await
            .map_err(|err| DbError::InstructionError(err.to_string()))?;

        Ok(())
    }

    pub async fn bucket<T>(&self, key: String) -> Result<Bucket<T>, DbError>
    where
        T: Serialize + DeserializeOwned,
    {
        match self.get(key).await? {
            Some(bytes) => Bucket::try_from(bytes),
            None => Ok(Bucket::new()),
        }
    }
}

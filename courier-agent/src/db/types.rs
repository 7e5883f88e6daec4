use rst_common::with_errors::thiserror::{self, Error};

#[derive(Error, PartialEq, Debug, Clone)]
pub enum DbError {
    #[error("bucket error: {0}")]
    BucketError(String),

    #[error("instruction error: {0}")]
    InstructionError(String),

    #[error("unexpected output: {0}")]
    OutputError(String),

    #[error("read error: {0}")]
    ReadError(String),

    #[error("missing value: {0}")]
    MissingValue(String),
}

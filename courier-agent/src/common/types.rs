use rst_common::with_errors::thiserror::{self, Error};

use prople_courier_core::identity::connection::types::ConnectionError;
use prople_courier_core::identity::verifiable::credential::types::CredentialError;
use prople_courier_core::identity::verifiable::exchange::types::ExchangeError;
use prople_courier_core::messaging::types::{CryptoError, MessagingError};

#[derive(Debug, PartialEq, Error)]
pub enum CommonError {
    #[error("valdation error: {0}")]
    ValidationError(String),

    #[error("db error: {0}")]
    DBError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("http error: {0}")]
    HttpError(String),
}

pub trait ToValidate {
    fn validate(&self) -> Result<(), CommonError>;
}

/// `AgentError` is returned by the assembled agent, it wraps every domain error
/// reachable from the inbound and admin paths
#[derive(Debug, PartialEq, Error)]
pub enum AgentError {
    #[error(transparent)]
    CommonError(#[from] CommonError),

    #[error("messaging error: {0}")]
    MessagingError(#[from] MessagingError),

    #[error("connection error: {0}")]
    ConnectionError(#[from] ConnectionError),

    #[error("exchange error: {0}")]
    ExchangeError(#[from] ExchangeError),

    #[error("credential error: {0}")]
    CredentialError(#[from] CredentialError),

    #[error("crypto error: {0}")]
    CryptoError(#[from] CryptoError),
}

use std::collections::BTreeMap;
use std::fmt::Debug;

use rst_common::standard::async_trait::async_trait;
use rst_common::with_errors::thiserror::{self, Error};

use rstdev_domain::entity::ToJSON;

use super::CredentialInfo;

/// CredentialError is a base error types for the wallet resident credentials
#[derive(Debug, PartialEq, Error, Clone)]
pub enum CredentialError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("credential not found: {0}")]
    CredentialNotFound(String),

    #[error("repo error: {0}")]
    RepoError(String),

    #[error("json error: {0}")]
    GenerateJSONError(String),

    #[error("unserialize error: {0}")]
    UnserializeError(String),
}

pub trait CredentialEntityAccessor:
    Clone + Debug + ToJSON + TryInto<Vec<u8>> + TryFrom<Vec<u8>>
{
    fn get_referent(&self) -> String;
    fn get_schema_id(&self) -> String;
    fn get_cred_def_id(&self) -> String;
    fn get_rev_reg_id(&self) -> Option<String>;
    fn get_attrs(&self) -> BTreeMap<String, String>;
}

/// `RepoBuilder` is the read path over the credentials stored in the wallet
///
/// `list_credentials` must return credentials in wallet insertion order
#[async_trait]
pub trait RepoBuilder: Clone + Sync + Send {
    async fn save_credential(&self, credential: &CredentialInfo) -> Result<(), CredentialError>;

    async fn get_credential_by_id(&self, referent: String)
        -> Result<CredentialInfo, CredentialError>;

    async fn list_credentials(&self) -> Result<Vec<CredentialInfo>, CredentialError>;
}

use std::collections::BTreeMap;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::Value;
use rst_common::with_errors::thiserror::{self, Error};

/// `LedgerError` is returned by a [`LedgerBuilder`] implementer
#[derive(Debug, PartialEq, Error, Clone)]
pub enum LedgerError {
    #[error("ledger object not found: {0}")]
    NotFound(String),

    #[error("ledger lookup error: {0}")]
    LookupError(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
pub struct Schema {
    pub id: String,
    pub name: String,
    pub version: String,
    pub attr_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
pub struct CredentialDefinition {
    pub id: String,
    pub schema_id: String,
    pub tag: String,

    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
pub struct RevocationRegistry {
    pub id: String,
    pub cred_def_id: String,

    #[serde(default)]
    pub value: Value,
}

/// `LedgerData` is the public data resolved for every credential taking part in a proof,
/// keyed by ledger identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
pub struct LedgerData {
    pub schemas: BTreeMap<String, Schema>,
    pub credential_definitions: BTreeMap<String, CredentialDefinition>,
    pub revocation_registries: BTreeMap<String, RevocationRegistry>,
}

/// `LedgerBuilder` is a read-only lookup service over the public ledger
#[async_trait]
pub trait LedgerBuilder: Clone + Sync + Send {
    async fn get_schema(&self, id: String) -> Result<Schema, LedgerError>;

    async fn get_credential_definition(
        &self,
        id: String,
    ) -> Result<CredentialDefinition, LedgerError>;

    async fn get_revocation_registry(&self, id: String)
        -> Result<RevocationRegistry, LedgerError>;
}

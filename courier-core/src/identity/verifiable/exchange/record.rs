use rst_common::standard::chrono::serde::ts_seconds;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::standard::uuid::Uuid;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use super::types::{ExchangeError, ExchangeEvent};

/// `ProofRecord` is written at every transition of an exchange, listing them by request id
/// gives the history of that exchange
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct ProofRecord {
    pub(crate) id: String,

    #[serde(rename = "proofRequestId")]
    pub(crate) proof_request_id: String,

    #[serde(rename = "proofId")]
    pub(crate) proof_id: Option<String>,

    #[serde(rename = "connectionId")]
    pub(crate) connection_id: Option<String>,

    pub(crate) event: ExchangeEvent,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "createdAt")]
    pub(crate) created_at: DateTime<Utc>,
}

impl ProofRecord {
    pub fn new(
        proof_request_id: String,
        proof_id: Option<String>,
        connection_id: Option<String>,
        event: ExchangeEvent,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            proof_request_id,
            proof_id,
            connection_id,
            event,
            created_at: Utc::now(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.to_owned()
    }

    pub fn get_proof_request_id(&self) -> String {
        self.proof_request_id.to_owned()
    }

    pub fn get_proof_id(&self) -> Option<String> {
        self.proof_id.to_owned()
    }

    pub fn get_connection_id(&self) -> Option<String> {
        self.connection_id.to_owned()
    }

    pub fn get_event(&self) -> ExchangeEvent {
        self.event.to_owned()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ToJSON for ProofRecord {
    fn to_json(&self) -> Result<String, BaseError> {
        let json_str =
            serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))?;

        Ok(json_str)
    }
}

impl TryInto<Vec<u8>> for ProofRecord {
    type Error = ExchangeError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        let json = serde_json::to_vec(&self)
            .map_err(|err| ExchangeError::GenerateJSONError(err.to_string()))?;
        Ok(json)
    }
}

impl TryFrom<Vec<u8>> for ProofRecord {
    type Error = ExchangeError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let record: ProofRecord = serde_json::from_slice(&value)
            .map_err(|err| ExchangeError::UnserializeError(err.to_string()))?;
        Ok(record)
    }
}

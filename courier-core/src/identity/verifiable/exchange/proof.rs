use rst_common::standard::chrono::serde::ts_seconds;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::standard::uuid::Uuid;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use crate::identity::verifiable::proof::PresentedProof;

use super::types::{ExchangeError, ProofState};
use super::ProofRequest;

/// `Proof` is a presented proof bound to the request it answers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct Proof {
    pub(crate) id: String,

    #[serde(rename = "proofRequestId")]
    pub(crate) proof_request_id: String,

    #[serde(rename = "threadId")]
    pub(crate) thread_id: String,

    #[serde(rename = "connectionId")]
    pub(crate) connection_id: Option<String>,

    pub(crate) presented: PresentedProof,
    pub(crate) state: ProofState,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "createdAt")]
    pub(crate) created_at: DateTime<Utc>,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "updatedAt")]
    pub(crate) updated_at: DateTime<Utc>,
}

impl Proof {
    fn build(request: &ProofRequest, presented: PresentedProof, state: ProofState) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            proof_request_id: request.get_id(),
            thread_id: request.get_thread_id(),
            connection_id: request.get_connection_id(),
            presented,
            state,
            created_at: now,
            updated_at: now,
        }
    }

    /// `new` is a proof built locally by the holder
    pub fn new(request: &ProofRequest, presented: PresentedProof) -> Self {
        Self::build(request, presented, ProofState::Created)
    }

    /// `received` is a proof delivered by the holder to the requester
    pub fn received(request: &ProofRequest, presented: PresentedProof) -> Self {
        Self::build(request, presented, ProofState::Received)
    }

    pub fn transition(&mut self, next: ProofState) -> Result<(), ExchangeError> {
        if !self.state.can_transition_to(&next) {
            return Err(ExchangeError::InvalidStateTransition(format!(
                "proof {}: {:?} -> {:?}",
                self.id, self.state, next
            )));
        }

        self.state = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn get_id(&self) -> String {
        self.id.to_owned()
    }

    pub fn get_proof_request_id(&self) -> String {
        self.proof_request_id.to_owned()
    }

    pub fn get_thread_id(&self) -> String {
        self.thread_id.to_owned()
    }

    pub fn get_connection_id(&self) -> Option<String> {
        self.connection_id.to_owned()
    }

    pub fn get_presented(&self) -> PresentedProof {
        self.presented.to_owned()
    }

    pub fn get_state(&self) -> ProofState {
        self.state.to_owned()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl ToJSON for Proof {
    fn to_json(&self) -> Result<String, BaseError> {
        let json_str =
            serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))?;

        Ok(json_str)
    }
}

impl TryInto<Vec<u8>> for Proof {
    type Error = ExchangeError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        let json = serde_json::to_vec(&self)
            .map_err(|err| ExchangeError::GenerateJSONError(err.to_string()))?;
        Ok(json)
    }
}

impl TryFrom<Vec<u8>> for Proof {
    type Error = ExchangeError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let proof: Proof = serde_json::from_slice(&value)
            .map_err(|err| ExchangeError::UnserializeError(err.to_string()))?;
        Ok(proof)
    }
}

use rst_common::standard::chrono::serde::ts_seconds;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::standard::uuid::Uuid;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use crate::identity::verifiable::proof::ProofRequestObject;

use super::types::{ExchangeError, RequestState, Role};

/// `ProofRequest` is a persisted [`ProofRequestObject`] bound to a connection
///
/// The `thread_id` is shared by both agents: it is the requester's own id, the holder
/// keeps it to answer on the same thread
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct ProofRequest {
    pub(crate) id: String,

    #[serde(rename = "threadId")]
    pub(crate) thread_id: String,

    #[serde(rename = "connectionId")]
    pub(crate) connection_id: Option<String>,

    pub(crate) role: Role,
    pub(crate) request: ProofRequestObject,
    pub(crate) state: RequestState,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "createdAt")]
    pub(crate) created_at: DateTime<Utc>,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "updatedAt")]
    pub(crate) updated_at: DateTime<Utc>,
}

impl ProofRequest {
    pub fn new(connection_id: String, request: ProofRequestObject) -> Self {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        Self {
            thread_id: id.clone(),
            id,
            connection_id: Some(connection_id),
            role: Role::Requester,
            request,
            state: RequestState::Created,
            created_at: now,
            updated_at: now,
        }
    }

    /// `received` builds the holder side copy of a remote request
    pub fn received(
        connection_id: Option<String>,
        thread_id: String,
        request: ProofRequestObject,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            thread_id,
            connection_id,
            role: Role::Holder,
            request,
            state: RequestState::Received,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ExchangeError> {
        if self.id.is_empty() || self.thread_id.is_empty() {
            return Err(ExchangeError::ValidationError(
                "id or thread_id was missing".to_string(),
            ));
        }

        self.request.validate()?;
        Ok(())
    }

    pub fn transition(&mut self, next: RequestState) -> Result<(), ExchangeError> {
        if !self.state.can_transition_to(&next) {
            return Err(ExchangeError::InvalidStateTransition(format!(
                "proof request {}: {:?} -> {:?}",
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

    pub fn get_thread_id(&self) -> String {
        self.thread_id.to_owned()
    }

    pub fn get_connection_id(&self) -> Option<String> {
        self.connection_id.to_owned()
    }

    pub fn get_role(&self) -> Role {
        self.role.to_owned()
    }

    pub fn get_request(&self) -> ProofRequestObject {
        self.request.to_owned()
    }

    pub fn get_state(&self) -> RequestState {
        self.state.to_owned()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl ToJSON for ProofRequest {
    fn to_json(&self) -> Result<String, BaseError> {
        let json_str =
            serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))?;

        Ok(json_str)
    }
}

impl TryInto<Vec<u8>> for ProofRequest {
    type Error = ExchangeError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        let json = serde_json::to_vec(&self)
            .map_err(|err| ExchangeError::GenerateJSONError(err.to_string()))?;
        Ok(json)
    }
}

impl TryFrom<Vec<u8>> for ProofRequest {
    type Error = ExchangeError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let request: ProofRequest = serde_json::from_slice(&value)
            .map_err(|err| ExchangeError::UnserializeError(err.to_string()))?;
        Ok(request)
    }
}

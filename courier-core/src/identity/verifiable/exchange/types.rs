use std::collections::BTreeMap;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

use crate::identity::connection::types::ConnectionError;
use crate::identity::connection::Connection;
use crate::identity::verifiable::credential::types::CredentialError;
use crate::identity::verifiable::credential::CredentialsForRequest;
use crate::identity::verifiable::proof::types::ProofError;
use crate::identity::verifiable::proof::{AttributeInfo, PredicateInfo, RequestedCredentials};
use crate::messaging::message::{ProofMessage, ProofRejectionMessage, ProofRequestMessage};
use crate::messaging::types::MessagingError;
use crate::messaging::MessageContext;

use super::{Proof, ProofRecord, ProofRequest};

/// ExchangeError is a base error types for the proof exchange orchestration
#[derive(Debug, PartialEq, Error, Clone)]
pub enum ExchangeError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("proof request not found: {0}")]
    ProofRequestNotFound(String),

    #[error("proof not found: {0}")]
    ProofNotFound(String),

    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("repo error: {0}")]
    RepoError(String),

    #[error("unsupported message: {0}")]
    UnsupportedMessage(String),

    #[error("json error: {0}")]
    GenerateJSONError(String),

    #[error("unserialize error: {0}")]
    UnserializeError(String),

    #[error("connection error: {0}")]
    ConnectionError(#[from] ConnectionError),

    #[error("proof error: {0}")]
    ProofError(#[from] ProofError),

    #[error("messaging error: {0}")]
    MessagingError(#[from] MessagingError),

    #[error("credential error: {0}")]
    CredentialError(#[from] CredentialError),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde", rename_all = "snake_case")]
pub enum Role {
    Requester,
    Holder,
}

/// `RequestState` is the lifecycle of a [`ProofRequest`]
///
/// A requester moves `Created -> Sent`, and `Sent -> Rejected` when the holder declines.
/// A holder moves `Received -> Accepted` or `Received -> Rejected`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde", rename_all = "snake_case")]
pub enum RequestState {
    Created,
    Sent,
    Received,
    Accepted,
    Rejected,
}

impl RequestState {
    pub fn can_transition_to(&self, next: &RequestState) -> bool {
        matches!(
            (self, next),
            (RequestState::Created, RequestState::Sent)
                | (RequestState::Sent, RequestState::Rejected)
                | (RequestState::Received, RequestState::Accepted)
                | (RequestState::Received, RequestState::Rejected)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Accepted | RequestState::Rejected)
    }
}

/// `ProofState` is the lifecycle of a [`Proof`]
///
/// A holder moves `Created -> Sent`, a requester moves `Received -> Verified` or
/// `Received -> VerificationFailed`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde", rename_all = "snake_case")]
pub enum ProofState {
    Created,
    Sent,
    Received,
    Verified,
    VerificationFailed,
}

impl ProofState {
    pub fn can_transition_to(&self, next: &ProofState) -> bool {
        matches!(
            (self, next),
            (ProofState::Created, ProofState::Sent)
                | (ProofState::Received, ProofState::Verified)
                | (ProofState::Received, ProofState::VerificationFailed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProofState::Verified | ProofState::VerificationFailed)
    }
}

/// `ExchangeEvent` names the transition a [`ProofRecord`] was written for
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde", tag = "event", rename_all = "snake_case")]
pub enum ExchangeEvent {
    RequestCreated,
    RequestSent,
    RequestSendFailed { reason: String },
    RequestReceived,
    RequestAccepted,
    RequestRejected { reason: Option<String> },
    RejectionSendFailed { reason: String },
    RemoteRejected { reason: Option<String> },
    ProofSent,
    ProofSendFailed { reason: String },
    ProofVerified,
    ProofVerificationFailed,
    ProofVerificationError { reason: String },
}

impl ExchangeEvent {
    /// `settles_proof` is true for the events closing a requester thread with a verdict
    pub fn settles_proof(&self) -> bool {
        matches!(
            self,
            ExchangeEvent::ProofVerified | ExchangeEvent::ProofVerificationFailed
        )
    }
}

/// `HandleOutcome` tells the caller what an inbound message changed
#[derive(Debug, Clone, PartialEq)]
pub enum HandleOutcome {
    RequestReceived(ProofRequest),
    ProofReceived(Proof),
    RejectionReceived(ProofRequest),
}

/// `ExchangeAPI` is the main entrypoint of the proof exchange domain
#[async_trait]
pub trait ExchangeAPI: Clone + Sync + Send {
    async fn create_proof_request(
        &self,
        connection_id: String,
        name: String,
        requested_attributes: BTreeMap<String, AttributeInfo>,
        requested_predicates: BTreeMap<String, PredicateInfo>,
    ) -> Result<ProofRequest, ExchangeError>;

    /// `store_proof_request` persists a request, saving the same id twice overwrites it
    async fn store_proof_request(&self, request: ProofRequest) -> Result<String, ExchangeError>;

    async fn send_proof_request(&self, id: String) -> Result<ProofRequest, ExchangeError>;

    async fn receive_proof_request(
        &self,
        connection: Option<Connection>,
        message: ProofRequestMessage,
    ) -> Result<ProofRequest, ExchangeError>;

    async fn list_credentials_for_request(
        &self,
        id: String,
        referent: Option<String>,
    ) -> Result<CredentialsForRequest, ExchangeError>;

    async fn accept_proof_request(
        &self,
        id: String,
        requested_credentials: RequestedCredentials,
    ) -> Result<Proof, ExchangeError>;

    async fn resend_proof(&self, proof_id: String) -> Result<Proof, ExchangeError>;

    async fn reject_proof_request(
        &self,
        id: String,
        reason: Option<String>,
    ) -> Result<ProofRequest, ExchangeError>;

    async fn receive_proof(
        &self,
        connection: Option<Connection>,
        message: ProofMessage,
    ) -> Result<Proof, ExchangeError>;

    async fn receive_rejection(
        &self,
        connection: Option<Connection>,
        message: ProofRejectionMessage,
    ) -> Result<ProofRequest, ExchangeError>;

    /// `handle` routes a message coming out of the dispatcher receive path
    async fn handle(&self, context: MessageContext) -> Result<HandleOutcome, ExchangeError>;

    async fn get_proof_request(&self, id: String) -> Result<ProofRequest, ExchangeError>;
    async fn list_proof_requests(&self) -> Result<Vec<ProofRequest>, ExchangeError>;
    async fn get_proof(&self, id: String) -> Result<Proof, ExchangeError>;
    async fn list_records(&self, request_id: String) -> Result<Vec<ProofRecord>, ExchangeError>;
}

/// `RepoBuilder` is the persistence abstraction of the proof exchange records
#[async_trait]
pub trait RepoBuilder: Clone + Sync + Send {
    async fn save_proof_request(&self, request: &ProofRequest) -> Result<(), ExchangeError>;

    async fn get_proof_request_by_id(&self, id: String) -> Result<ProofRequest, ExchangeError>;

    async fn list_proof_requests(&self) -> Result<Vec<ProofRequest>, ExchangeError>;

    async fn save_proof(&self, proof: &Proof) -> Result<(), ExchangeError>;

    async fn get_proof_by_id(&self, id: String) -> Result<Proof, ExchangeError>;

    async fn save_record(&self, record: &ProofRecord) -> Result<(), ExchangeError>;

    async fn list_records_by_request(
        &self,
        request_id: String,
    ) -> Result<Vec<ProofRecord>, ExchangeError>;
}

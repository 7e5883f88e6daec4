use std::fmt::Debug;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

use rstdev_domain::entity::ToJSON;

use crate::messaging::message::ConnectionRequest;
use crate::messaging::types::Verkey;

use super::Connection;

/// ConnectionError is a base error types for the `Connection` domain
#[derive(Debug, PartialEq, Error, Clone)]
pub enum ConnectionError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("repo error: {0}")]
    RepoError(String),

    #[error("entity error: {0}")]
    EntityError(String),

    #[error("json error: {0}")]
    GenerateJSONError(String),

    #[error("unserialize error: {0}")]
    UnserializeError(String),
}

/// State represents the pairwise relationship lifecycle
///
/// A connection starts as [`State::Invited`] when the local agent publishes an invitation key,
/// moves to [`State::Negotiating`] once the counterparty keys are known, and ends as
/// [`State::Connected`]. A connection never goes back to a previous state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub enum State {
    Invited,
    Negotiating,
    Connected,
}

impl State {
    pub fn can_transition_to(&self, next: &State) -> bool {
        matches!(
            (self, next),
            (State::Invited, State::Negotiating) | (State::Negotiating, State::Connected)
        )
    }
}

/// `Endpoint` is the counterparty service endpoint
///
/// The `routing_verkey` addresses the forward envelope, the `service_verkey` is the key
/// used to anonymously seal the outer envelope for the transport endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct Endpoint {
    pub uri: String,

    #[serde(rename = "routingVerkey")]
    pub routing_verkey: Verkey,

    #[serde(rename = "serviceVerkey")]
    pub service_verkey: Verkey,
}

impl Endpoint {
    pub fn new(uri: String, routing_verkey: Verkey, service_verkey: Verkey) -> Self {
        Self {
            uri,
            routing_verkey,
            service_verkey,
        }
    }
}

pub trait ConnectionEntityAccessor:
    Clone + Debug + ToJSON + TryInto<Vec<u8>> + TryFrom<Vec<u8>>
{
    fn get_id(&self) -> String;
    fn get_alias(&self) -> String;
    fn get_my_did(&self) -> String;
    fn get_my_verkey(&self) -> Verkey;
    fn get_their_did(&self) -> Option<String>;
    fn get_their_verkey(&self) -> Option<Verkey>;
    fn get_endpoint(&self) -> Option<Endpoint>;
    fn get_state(&self) -> State;
    fn get_created_at(&self) -> DateTime<Utc>;
    fn get_updated_at(&self) -> DateTime<Utc>;
}

/// `DirectoryAPI` is the main entrypoint of the `Connection` domain
///
/// The read path used by the message dispatcher is [`DirectoryAPI::resolve_by_verkey`], other
/// methods maintain the connection records themselves
#[async_trait]
pub trait DirectoryAPI: Clone + Sync + Send {
    async fn save_connection(&self, connection: Connection) -> Result<Connection, ConnectionError>;

    async fn get_connection(&self, id: String) -> Result<Connection, ConnectionError>;

    /// `resolve_by_verkey` looks up the connection whose counterparty key matches the given key
    ///
    /// A missing connection is a normal `None` result, e.g. for the very first connection request
    async fn resolve_by_verkey(&self, verkey: Verkey)
        -> Result<Option<Connection>, ConnectionError>;

    /// `accept_connection_request` binds an incoming connection request to the invitation
    /// owning the `recipient` key
    async fn accept_connection_request(
        &self,
        recipient: Verkey,
        request: ConnectionRequest,
    ) -> Result<Connection, ConnectionError>;

    async fn complete_connection(&self, id: String) -> Result<Connection, ConnectionError>;
}

#[async_trait]
pub trait RepoBuilder: Clone + Sync + Send {
    async fn save(&self, connection: &Connection) -> Result<(), ConnectionError>;
    async fn get_by_id(&self, id: String) -> Result<Connection, ConnectionError>;

    async fn find_by_their_verkey(
        &self,
        verkey: Verkey,
    ) -> Result<Option<Connection>, ConnectionError>;

    async fn find_by_my_verkey(&self, verkey: Verkey)
        -> Result<Option<Connection>, ConnectionError>;
}

use derive_more::{AsRef, Display, From, Into};
use the_newtype::Newtype;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_errors::thiserror::{self, Error};

use crate::identity::connection::Connection;

use super::{AgentMessage, MessageContext};

/// Content type attached to every outbound wire envelope
pub const CONTENT_TYPE_AGENT_WIRE: &str = "application/ssi-agent-wire";

/// Maximum number of forward envelopes unwrapped on the receive path
pub const MAX_FORWARD_DEPTH: usize = 1;

/// Default upper bound for a single outbound HTTP delivery
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 30;

/// `Verkey` is a public verification / encryption key identifying an agent or
/// a connection endpoint. Its textual form is owned by the crypto implementer.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Newtype, From, Into, AsRef, Display,
)]
#[serde(crate = "self::serde")]
pub struct Verkey(String);

impl Verkey {
    pub fn new(val: impl Into<String>) -> Self {
        Self(val.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `MessagingError` covers the whole message packing/unpacking protocol
///
/// Any error coming from the cryptographic primitives is translated into
/// [`MessagingError::UnpackError`] or [`MessagingError::PackError`] before leaving
/// the envelope codec
#[derive(Debug, PartialEq, Error, Clone)]
pub enum MessagingError {
    #[error("unpack error: {0}")]
    UnpackError(String),

    #[error("pack error: {0}")]
    PackError(String),

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("forward depth exceeded: {0}")]
    ForwardDepthExceeded(usize),

    #[error("message error: {0}")]
    MessageError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// `CryptoError` is the error type returned by a [`CryptoBuilder`] implementer
#[derive(Debug, PartialEq, Error, Clone)]
pub enum CryptoError {
    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("encrypt error: {0}")]
    EncryptError(String),

    #[error("decrypt error: {0}")]
    DecryptError(String),

    #[error("key error: {0}")]
    KeyError(String),
}

/// `CryptoBuilder` is the capability to seal and open messages with keys
/// owned by the local wallet
///
/// Decrypt operations must fail when the recipient key is not owned by the wallet
/// or when the ciphertext has been tampered with
#[async_trait]
pub trait CryptoBuilder: Clone + Sync + Send {
    async fn auth_encrypt(
        &self,
        sender: Verkey,
        recipient: Verkey,
        msg: Vec<u8>,
    ) -> Result<Vec<u8>, CryptoError>;

    async fn auth_decrypt(
        &self,
        recipient: Verkey,
        sender: Verkey,
        ciphertext: Vec<u8>,
    ) -> Result<Vec<u8>, CryptoError>;

    async fn anon_encrypt(&self, recipient: Verkey, msg: Vec<u8>) -> Result<Vec<u8>, CryptoError>;

    async fn anon_decrypt(
        &self,
        recipient: Verkey,
        ciphertext: Vec<u8>,
    ) -> Result<Vec<u8>, CryptoError>;
}

/// `TransportBuilder` is a generic "POST bytes to URI" capability
///
/// It returns the HTTP status code of the response, network level failures
/// must be reported as [`MessagingError::TransportError`]
#[async_trait]
pub trait TransportBuilder: Clone + Sync + Send {
    async fn post(
        &self,
        uri: String,
        content_type: String,
        body: Vec<u8>,
    ) -> Result<u16, MessagingError>;
}

/// `DispatcherAPI` is the main entrypoint of the messaging domain
#[async_trait]
pub trait DispatcherAPI: Clone + Sync + Send {
    /// `send` packs the message into a nested envelope addressed to the connection's
    /// counterparty and delivers it to the counterparty's endpoint
    async fn send(&self, message: AgentMessage, connection: Connection)
        -> Result<(), MessagingError>;

    /// `receive` unwraps raw inbound bytes into a typed and connection-bound [`MessageContext`]
    async fn receive(&self, raw: Vec<u8>) -> Result<MessageContext, MessagingError>;
}

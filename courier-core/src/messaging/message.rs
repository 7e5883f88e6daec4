use rst_common::standard::serde::{self, de::DeserializeOwned, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Map, Value};

use crate::identity::connection::types::{ConnectionError, Endpoint};
use crate::identity::verifiable::proof::{PresentedProof, ProofRequestObject};

use super::types::{MessagingError, Verkey};

/// Qualifier prepended to every message type name in the `@type` field
pub const MESSAGE_TYPE_PREFIX: &str = "https://didcomm.prople.org/courier/1.0/";

pub const MESSAGE_TYPE_FIELD: &str = "@type";

/// `MessageType` is the closed set of message types understood by this agent
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageType {
    ConnectionRequest,
    ProofRequest,
    Proof,
    ProofRejection,
    Unrecognized(String),
}

impl MessageType {
    pub fn name(&self) -> &str {
        match self {
            MessageType::ConnectionRequest => "connection-request",
            MessageType::ProofRequest => "proof-request",
            MessageType::Proof => "proof",
            MessageType::ProofRejection => "proof-rejection",
            MessageType::Unrecognized(tag) => tag.as_str(),
        }
    }

    pub fn to_tag(&self) -> String {
        match self {
            MessageType::Unrecognized(tag) => tag.to_owned(),
            _ => format!("{}{}", MESSAGE_TYPE_PREFIX, self.name()),
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        let name = tag.strip_prefix(MESSAGE_TYPE_PREFIX);
        match name {
            Some("connection-request") => MessageType::ConnectionRequest,
            Some("proof-request") => MessageType::ProofRequest,
            Some("proof") => MessageType::Proof,
            Some("proof-rejection") => MessageType::ProofRejection,
            _ => MessageType::Unrecognized(tag.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ConnectionRequest {
    label: String,
    did: String,
    verkey: Verkey,
    endpoint: Endpoint,
}

impl ConnectionRequest {
    pub fn new(label: String, did: String, verkey: Verkey, endpoint: Endpoint) -> Self {
        Self {
            label,
            did,
            verkey,
            endpoint,
        }
    }

    pub fn validate(&self) -> Result<(), ConnectionError> {
        if self.did.is_empty() {
            return Err(ConnectionError::ValidationError(
                "connection request did was missing".to_string(),
            ));
        }

        if self.verkey.is_empty() {
            return Err(ConnectionError::ValidationError(
                "connection request verkey was missing".to_string(),
            ));
        }

        if self.endpoint.uri.is_empty() {
            return Err(ConnectionError::ValidationError(
                "connection request endpoint was missing".to_string(),
            ));
        }

        Ok(())
    }

    pub fn get_label(&self) -> String {
        self.label.to_owned()
    }

    pub fn get_did(&self) -> String {
        self.did.to_owned()
    }

    pub fn get_verkey(&self) -> Verkey {
        self.verkey.to_owned()
    }

    pub fn get_endpoint(&self) -> Endpoint {
        self.endpoint.to_owned()
    }
}

/// `ProofRequestMessage` carries a proof request, its `id` becomes the exchange thread id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ProofRequestMessage {
    pub id: String,
    pub request: ProofRequestObject,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ProofMessage {
    #[serde(rename = "threadId")]
    pub thread_id: String,

    pub proof: PresentedProof,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ProofRejectionMessage {
    #[serde(rename = "threadId")]
    pub thread_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `AgentMessage` is a decrypted message routed by its `@type`
///
/// Unknown types are kept as [`AgentMessage::Unrecognized`] so the caller decides
/// what to do with them
#[derive(Debug, Clone, PartialEq)]
pub enum AgentMessage {
    ConnectionRequest(ConnectionRequest),
    ProofRequest(ProofRequestMessage),
    Proof(ProofMessage),
    ProofRejection(ProofRejectionMessage),
    Unrecognized { type_tag: String, body: Value },
}

impl AgentMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            AgentMessage::ConnectionRequest(_) => MessageType::ConnectionRequest,
            AgentMessage::ProofRequest(_) => MessageType::ProofRequest,
            AgentMessage::Proof(_) => MessageType::Proof,
            AgentMessage::ProofRejection(_) => MessageType::ProofRejection,
            AgentMessage::Unrecognized { type_tag, .. } => {
                MessageType::Unrecognized(type_tag.to_owned())
            }
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, MessagingError> {
        let body = match self {
            AgentMessage::ConnectionRequest(msg) => to_value(msg)?,
            AgentMessage::ProofRequest(msg) => to_value(msg)?,
            AgentMessage::Proof(msg) => to_value(msg)?,
            AgentMessage::ProofRejection(msg) => to_value(msg)?,
            AgentMessage::Unrecognized { body, .. } => body.to_owned(),
        };

        let mut fields = match body {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };

        fields.insert(
            MESSAGE_TYPE_FIELD.to_string(),
            Value::String(self.message_type().to_tag()),
        );

        serde_json::to_vec(&Value::Object(fields))
            .map_err(|err| MessagingError::PackError(err.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessagingError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|err| MessagingError::MessageError(format!("invalid payload: {}", err)))?;

        let mut fields = match value {
            Value::Object(fields) => fields,
            _ => {
                return Err(MessagingError::MessageError(
                    "payload is not an object".to_string(),
                ))
            }
        };

        let type_tag = match fields.remove(MESSAGE_TYPE_FIELD) {
            Some(Value::String(tag)) => tag,
            _ => {
                return Err(MessagingError::MessageError(
                    "@type was missing".to_string(),
                ))
            }
        };

        let body = Value::Object(fields);
        let message = match MessageType::from_tag(&type_tag) {
            MessageType::ConnectionRequest => AgentMessage::ConnectionRequest(from_value(body)?),
            MessageType::ProofRequest => AgentMessage::ProofRequest(from_value(body)?),
            MessageType::Proof => AgentMessage::Proof(from_value(body)?),
            MessageType::ProofRejection => AgentMessage::ProofRejection(from_value(body)?),
            MessageType::Unrecognized(type_tag) => AgentMessage::Unrecognized { type_tag, body },
        };

        Ok(message)
    }
}

fn to_value<T: Serialize>(msg: &T) -> Result<Value, MessagingError> {
    serde_json::to_value(msg).map_err(|err| MessagingError::PackError(err.to_string()))
}

fn from_value<T: DeserializeOwned>(body: Value) -> Result<T, MessagingError> {
    serde_json::from_value(body)
        .map_err(|err| MessagingError::MessageError(format!("invalid message body: {}", err)))
}

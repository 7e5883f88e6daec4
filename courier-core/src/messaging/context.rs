use crate::identity::connection::Connection;

use super::types::Verkey;
use super::AgentMessage;

/// `MessageContext` is the result of a successful receive
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub(crate) message_type: String,
    pub(crate) message: AgentMessage,
    pub(crate) payload: Vec<u8>,
    pub(crate) connection: Option<Connection>,
    pub(crate) sender_verkey: Option<Verkey>,
    pub(crate) recipient_verkey: Verkey,
}

impl MessageContext {
    pub fn new(
        message: AgentMessage,
        payload: Vec<u8>,
        connection: Option<Connection>,
        sender_verkey: Option<Verkey>,
        recipient_verkey: Verkey,
    ) -> Self {
        Self {
            message_type: message.message_type().to_tag(),
            message,
            payload,
            connection,
            sender_verkey,
            recipient_verkey,
        }
    }

    pub fn get_message_type(&self) -> String {
        self.message_type.to_owned()
    }

    pub fn get_message(&self) -> &AgentMessage {
        &self.message
    }

    pub fn get_payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn get_connection(&self) -> Option<Connection> {
        self.connection.to_owned()
    }

    pub fn get_sender_verkey(&self) -> Option<Verkey> {
        self.sender_verkey.to_owned()
    }

    pub fn get_recipient_verkey(&self) -> Verkey {
        self.recipient_verkey.to_owned()
    }
}

//! Agent-to-agent message packing and delivery
//!
//! Outbound messages are sealed twice: an authenticated envelope for the counterparty
//! wrapped into a forward message, itself anonymously sealed for the counterparty's
//! transport endpoint. The receive path undoes the layers and binds the plaintext to
//! a known connection.
pub mod types;

pub mod envelope;
pub use envelope::{AgentWireMessage, Codec, ForwardMessage};

pub mod message;
pub use message::{AgentMessage, MessageType};

mod context;
pub use context::MessageContext;

mod dispatcher;
pub use dispatcher::Dispatcher;

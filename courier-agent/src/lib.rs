//! `prople-courier-agent` runs the courier protocol for a single agent
//!
//! It provides the adapters expected by `prople-courier-core`: a rocksdb wallet for
//! connections, credentials, proof exchanges and key secrets, an X25519 keyring and
//! HTTP clients for the wire transport, the ledger gateway and the proof engine.
pub mod common;
pub mod config;
pub mod crypto;
pub mod db;
pub mod http;
pub mod wallet;

mod agent;
pub use agent::{AgentDirectory, AgentDispatcher, AgentExchange, CourierAgent, ReceiveOutcome};

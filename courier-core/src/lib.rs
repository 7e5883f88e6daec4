//! `prople-courier-core` holds the protocol logic of a self-sovereign identity agent:
//! the encrypted envelope codec, the message dispatcher and the proof exchange state machine.
//!
//! All external capabilities (wallet storage, cryptographic primitives, ledger lookup and HTTP
//! transport) are consumed through traits, implemented by the `prople-courier-agent` crate.
pub mod identity;
pub mod messaging;

#[cfg(test)]
pub(crate) mod fakes;

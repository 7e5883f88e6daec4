//! Proof exchange orchestration
//!
//! Ties the proof request store, the credential matcher and the proof builder and verifier
//! to the message dispatcher, and persists every transition as a [`ProofRecord`].
pub mod types;

mod proof_request;
pub use proof_request::ProofRequest;

mod proof;
pub use proof::Proof;

mod record;
pub use record::ProofRecord;

mod locker;
pub use locker::Locker;

mod usecase;
pub use usecase::Usecase;

use std::collections::BTreeMap;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde_json::Value;
use rst_common::with_errors::thiserror::{self, Error};

use crate::identity::verifiable::credential::types::CredentialError;
use crate::identity::verifiable::credential::CredentialInfo;
use crate::identity::verifiable::types::LedgerData;

use super::{PresentedProof, ProofRequestObject, RequestedProof};

/// ProofError is a base error types for building and verifying proofs
#[derive(Debug, PartialEq, Error, Clone)]
pub enum ProofError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("incomplete credential selection: {0}")]
    IncompleteCredentialSelection(String),

    #[error("predicate not satisfied: {0}")]
    PredicateNotSatisfied(String),

    #[error("ledger resolution error: {0}")]
    LedgerResolutionError(String),

    #[error("prover error: {0}")]
    ProverError(String),

    #[error("credential error: {0}")]
    CredentialError(#[from] CredentialError),

    #[error("json error: {0}")]
    GenerateJSONError(String),

    #[error("unserialize error: {0}")]
    UnserializeError(String),
}

/// `ProverBuilder` is the anonymous credential engine producing and checking the
/// cryptographic part of a proof
///
/// Everything it needs is handed over explicitly, it never reads the wallet nor the ledger
#[async_trait]
pub trait ProverBuilder: Clone + Sync + Send {
    async fn create_proof(
        &self,
        request: ProofRequestObject,
        requested_proof: RequestedProof,
        credentials: BTreeMap<String, CredentialInfo>,
        ledger: LedgerData,
    ) -> Result<Value, ProofError>;

    async fn verify_proof(
        &self,
        request: ProofRequestObject,
        proof: PresentedProof,
        ledger: LedgerData,
    ) -> Result<bool, ProofError>;
}

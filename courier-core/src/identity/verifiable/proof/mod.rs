//! Proof requests, proofs and the logic to build and verify them
pub mod types;

mod request;
pub use request::{
    AttributeInfo, PredicateInfo, PredicateType, ProofRequestObject, Restriction,
    DEFAULT_PROOF_REQUEST_VERSION,
};

mod proof;
pub use proof::{
    Identifier, PresentedProof, RequestedAttribute, RequestedCredentials, RequestedPredicate,
    RequestedProof, RevealedAttribute, RevealedAttributeGroup, SubProofReferent,
};

mod resolver;
pub use resolver::LedgerResolver;

mod builder;
pub use builder::ProofBuilder;

mod verifier;
pub use verifier::ProofVerifier;

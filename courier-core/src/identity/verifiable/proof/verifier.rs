use std::collections::BTreeSet;

use rst_common::with_logging::log::{info, warn};

use crate::identity::verifiable::types::{LedgerBuilder, LedgerData};

use super::types::{ProofError, ProverBuilder};
use super::{LedgerResolver, PresentedProof, ProofRequestObject};

/// `ProofVerifier` checks a received proof against the request it answers
#[derive(Clone)]
pub struct ProofVerifier<TLedger, TProver>
where
    TLedger: LedgerBuilder,
    TProver: ProverBuilder,
{
    resolver: LedgerResolver<TLedger>,
    prover: TProver,
}

impl<TLedger, TProver> ProofVerifier<TLedger, TProver>
where
    TLedger: LedgerBuilder,
    TProver: ProverBuilder,
{
    pub fn new(ledger: TLedger, prover: TProver) -> Self {
        Self {
            resolver: LedgerResolver::new(ledger),
            prover,
        }
    }

    fn structure_matches(request: &ProofRequestObject, proof: &PresentedProof) -> bool {
        let requested_attrs: BTreeSet<String> =
            request.requested_attributes.keys().cloned().collect();
        let requested_preds: BTreeSet<String> =
            request.requested_predicates.keys().cloned().collect();

        if proof.attribute_referents() != requested_attrs {
            warn!("proof attribute groups differ from the request");
            return false;
        }

        if proof.predicate_referents() != requested_preds {
            warn!("proof predicates differ from the request");
            return false;
        }

        let total = proof.identifiers.len();
        if proof.sub_proof_indexes().iter().any(|index| *index >= total) {
            warn!("proof references an unknown sub proof");
            return false;
        }

        let requested = &proof.requested_proof;
        for (referent, attribute) in request.requested_attributes.iter() {
            let index = requested
                .revealed_attrs
                .get(referent)
                .map(|val| val.sub_proof_index)
                .or_else(|| {
                    requested
                        .revealed_attr_groups
                        .get(referent)
                        .map(|val| val.sub_proof_index)
                })
                .or_else(|| {
                    requested
                        .unrevealed_attrs
                        .get(referent)
                        .map(|val| val.sub_proof_index)
                });

            let satisfied = index
                .and_then(|index| proof.identifiers.get(index))
                .map_or(false, |identifier| {
                    attribute.satisfies_restrictions(&identifier.schema_id, &identifier.cred_def_id)
                });

            if !satisfied {
                warn!("attribute {} violates the request restrictions", referent);
                return false;
            }
        }

        for (referent, predicate) in request.requested_predicates.iter() {
            let satisfied = requested
                .predicates
                .get(referent)
                .and_then(|val| proof.identifiers.get(val.sub_proof_index))
                .map_or(false, |identifier| {
                    predicate.satisfies_restrictions(&identifier.schema_id, &identifier.cred_def_id)
                });

            if !satisfied {
                warn!("predicate {} violates the request restrictions", referent);
                return false;
            }
        }

        true
    }

    /// `verify` resolves the ledger data referenced by the proof then checks it
    ///
    /// An invalid proof is `Ok(false)`, only an unresolvable ledger object or a failing
    /// prover raise an error
    pub async fn verify(
        &self,
        request: &ProofRequestObject,
        proof: &PresentedProof,
    ) -> Result<bool, ProofError> {
        let ledger = self.resolver.resolve(&proof.identifiers).await?;
        self.verify_with_ledger(request, proof, ledger).await
    }

    pub async fn verify_with_ledger(
        &self,
        request: &ProofRequestObject,
        proof: &PresentedProof,
        ledger: LedgerData,
    ) -> Result<bool, ProofError> {
        if !Self::structure_matches(request, proof) {
            return Ok(false);
        }

        let verified = self
            .prover
            .verify_proof(request.to_owned(), proof.to_owned(), ledger)
            .await?;

        info!("proof for {} verified: {}", request.name, verified);
        Ok(verified)
    }
}

use std::collections::{BTreeMap, BTreeSet};

use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use super::types::ProofError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct RequestedAttribute {
    pub cred_id: String,
    pub revealed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct RequestedPredicate {
    pub cred_id: String,
}

/// `RequestedCredentials` is the holder's selection of one credential for every
/// requested attribute group and predicate, keyed by referent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(crate = "self::serde")]
pub struct RequestedCredentials {
    #[serde(default)]
    pub requested_attributes: BTreeMap<String, RequestedAttribute>,

    #[serde(default)]
    pub requested_predicates: BTreeMap<String, RequestedPredicate>,
}

impl RequestedCredentials {
    pub fn attribute(mut self, referent: &str, cred_id: &str, revealed: bool) -> Self {
        self.requested_attributes.insert(
            referent.to_string(),
            RequestedAttribute {
                cred_id: cred_id.to_string(),
                revealed,
            },
        );
        self
    }

    pub fn predicate(mut self, referent: &str, cred_id: &str) -> Self {
        self.requested_predicates.insert(
            referent.to_string(),
            RequestedPredicate {
                cred_id: cred_id.to_string(),
            },
        );
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct RevealedAttribute {
    pub sub_proof_index: usize,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct RevealedAttributeGroup {
    pub sub_proof_index: usize,
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct SubProofReferent {
    pub sub_proof_index: usize,
}

/// `RequestedProof` maps every referent of the request to the sub proof answering it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(crate = "self::serde")]
pub struct RequestedProof {
    #[serde(default)]
    pub revealed_attrs: BTreeMap<String, RevealedAttribute>,

    #[serde(default)]
    pub revealed_attr_groups: BTreeMap<String, RevealedAttributeGroup>,

    #[serde(default)]
    pub unrevealed_attrs: BTreeMap<String, SubProofReferent>,

    #[serde(default)]
    pub predicates: BTreeMap<String, SubProofReferent>,
}

/// `Identifier` names the ledger objects of one sub proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct Identifier {
    pub schema_id: String,
    pub cred_def_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_reg_id: Option<String>,
}

/// `PresentedProof` is the holder's answer to a proof request
///
/// `proof` carries the prover output as it is, only the prover reads it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct PresentedProof {
    pub requested_proof: RequestedProof,
    pub identifiers: Vec<Identifier>,

    #[serde(default)]
    pub proof: Value,
}

impl PresentedProof {
    /// `attribute_referents` returns every attribute referent answered by this proof,
    /// revealed or not
    pub fn attribute_referents(&self) -> BTreeSet<String> {
        let proof = &self.requested_proof;
        proof
            .revealed_attrs
            .keys()
            .chain(proof.revealed_attr_groups.keys())
            .chain(proof.unrevealed_attrs.keys())
            .cloned()
            .collect()
    }

    pub fn predicate_referents(&self) -> BTreeSet<String> {
        self.requested_proof.predicates.keys().cloned().collect()
    }

    /// `sub_proof_indexes` lists every index referenced from the requested proof
    pub fn sub_proof_indexes(&self) -> Vec<usize> {
        let proof = &self.requested_proof;
        proof
            .revealed_attrs
            .values()
            .map(|val| val.sub_proof_index)
            .chain(
                proof
                    .revealed_attr_groups
                    .values()
                    .map(|val| val.sub_proof_index),
            )
            .chain(proof.unrevealed_attrs.values().map(|val| val.sub_proof_index))
            .chain(proof.predicates.values().map(|val| val.sub_proof_index))
            .collect()
    }

    pub fn revealed_value(&self, referent: &str) -> Option<String> {
        self.requested_proof
            .revealed_attrs
            .get(referent)
            .map(|val| val.raw.to_owned())
    }
}

impl ToJSON for PresentedProof {
    fn to_json(&self) -> Result<String, BaseError> {
        let json_str =
            serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))?;

        Ok(json_str)
    }
}

impl TryInto<Vec<u8>> for PresentedProof {
    type Error = ProofError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        let json = serde_json::to_vec(&self)
            .map_err(|err| ProofError::GenerateJSONError(err.to_string()))?;
        Ok(json)
    }
}

impl TryFrom<Vec<u8>> for PresentedProof {
    type Error = ProofError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let proof: PresentedProof = serde_json::from_slice(&value)
            .map_err(|err| ProofError::UnserializeError(err.to_string()))?;
        Ok(proof)
    }
}

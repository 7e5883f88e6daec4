use std::collections::BTreeMap;

use rst_common::standard::serde::{self, Deserialize, Serialize};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::identity::verifiable::{CredentialDefinitionId, SchemaId};

use super::types::ProofError;

pub const DEFAULT_PROOF_REQUEST_VERSION: &str = "1.0";

/// `Restriction` is one clause of a restriction list
///
/// All keys given inside one clause must match (AND), while an attribute or a predicate
/// carrying multiple clauses only needs one of them to match (OR). A clause without any
/// key matches every credential, so a key outside the supported set is refused when parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(crate = "self::serde", deny_unknown_fields)]
pub struct Restriction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_issuer_did: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_did: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_def_id: Option<String>,
}

impl Restriction {
    pub fn is_satisfied_by(&self, schema_id: &str, cred_def_id: &str) -> bool {
        let schema = SchemaId::parse(schema_id);
        let cred_def = CredentialDefinitionId::parse(cred_def_id);

        let checks = [
            self.schema_id.as_ref().map(|val| val == schema_id),
            self.cred_def_id.as_ref().map(|val| val == cred_def_id),
            self.schema_issuer_did.as_ref().map(|val| {
                schema
                    .as_ref()
                    .map_or(false, |schema| &schema.issuer_did == val)
            }),
            self.schema_name
                .as_ref()
                .map(|val| schema.as_ref().map_or(false, |schema| &schema.name == val)),
            self.schema_version.as_ref().map(|val| {
                schema
                    .as_ref()
                    .map_or(false, |schema| &schema.version == val)
            }),
            self.issuer_did.as_ref().map(|val| {
                cred_def
                    .as_ref()
                    .map_or(false, |cred_def| &cred_def.issuer_did == val)
            }),
        ];

        checks.iter().all(|check| check.unwrap_or(true))
    }
}

fn satisfies_any(restrictions: &Option<Vec<Restriction>>, schema_id: &str, cred_def_id: &str) -> bool {
    match restrictions {
        None => true,
        Some(clauses) if clauses.is_empty() => true,
        Some(clauses) => clauses
            .iter()
            .any(|clause| clause.is_satisfied_by(schema_id, cred_def_id)),
    }
}

/// `AttributeInfo` describes a requested attribute group
///
/// A group asks either for a single attribute through `name` or for several attributes
/// that must come from the same credential through `names`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(crate = "self::serde")]
pub struct AttributeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Vec<Restriction>>,
}

impl AttributeInfo {
    pub fn with_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn with_names(names: Vec<&str>) -> Self {
        Self {
            names: Some(names.iter().map(|val| val.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn restricted(mut self, restrictions: Vec<Restriction>) -> Self {
        self.restrictions = Some(restrictions);
        self
    }

    pub fn is_group(&self) -> bool {
        self.names.is_some()
    }

    pub fn requested_names(&self) -> Vec<String> {
        match (&self.name, &self.names) {
            (Some(name), _) => vec![name.to_owned()],
            (None, Some(names)) => names.to_owned(),
            (None, None) => Vec::new(),
        }
    }

    pub fn satisfies_restrictions(&self, schema_id: &str, cred_def_id: &str) -> bool {
        satisfies_any(&self.restrictions, schema_id, cred_def_id)
    }

    fn validate(&self, referent: &str) -> Result<(), ProofError> {
        match (&self.name, &self.names) {
            (Some(_), Some(_)) => Err(ProofError::ValidationError(format!(
                "attribute {} must not have both name and names",
                referent
            ))),
            (Some(name), None) if name.trim().is_empty() => Err(ProofError::ValidationError(
                format!("attribute {} name was missing", referent),
            )),
            (None, Some(names)) if names.is_empty() || names.iter().any(|val| val.trim().is_empty()) => {
                Err(ProofError::ValidationError(format!(
                    "attribute {} names were missing",
                    referent
                )))
            }
            (None, None) => Err(ProofError::ValidationError(format!(
                "attribute {} must have a name or names",
                referent
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub enum PredicateType {
    #[serde(rename = ">=")]
    GE,

    #[serde(rename = "<=")]
    LE,

    #[serde(rename = ">")]
    GT,

    #[serde(rename = "<")]
    LT,
}

impl PredicateType {
    pub fn is_satisfied(&self, value: i64, threshold: i64) -> bool {
        match self {
            PredicateType::GE => value >= threshold,
            PredicateType::LE => value <= threshold,
            PredicateType::GT => value > threshold,
            PredicateType::LT => value < threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct PredicateInfo {
    pub name: String,
    pub p_type: PredicateType,
    pub p_value: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Vec<Restriction>>,
}

impl PredicateInfo {
    pub fn new(name: &str, p_type: PredicateType, p_value: i64) -> Self {
        Self {
            name: name.to_string(),
            p_type,
            p_value,
            restrictions: None,
        }
    }

    pub fn restricted(mut self, restrictions: Vec<Restriction>) -> Self {
        self.restrictions = Some(restrictions);
        self
    }

    pub fn satisfies_restrictions(&self, schema_id: &str, cred_def_id: &str) -> bool {
        satisfies_any(&self.restrictions, schema_id, cred_def_id)
    }
}

/// `ProofRequestObject` describes what the requester asks the holder to disclose
///
/// Attribute groups and predicates are keyed by their referent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct ProofRequestObject {
    pub name: String,
    pub version: String,
    pub nonce: String,

    #[serde(default)]
    pub requested_attributes: BTreeMap<String, AttributeInfo>,

    #[serde(default)]
    pub requested_predicates: BTreeMap<String, PredicateInfo>,
}

impl ProofRequestObject {
    pub fn new(
        name: String,
        requested_attributes: BTreeMap<String, AttributeInfo>,
        requested_predicates: BTreeMap<String, PredicateInfo>,
    ) -> Self {
        Self {
            name,
            version: DEFAULT_PROOF_REQUEST_VERSION.to_string(),
            nonce: Self::generate_nonce(),
            requested_attributes,
            requested_predicates,
        }
    }

    /// `generate_nonce` returns a decimal string built from 128 random bits
    pub fn generate_nonce() -> String {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        u128::from_be_bytes(bytes).to_string()
    }

    pub fn validate(&self) -> Result<(), ProofError> {
        if self.name.is_empty() {
            return Err(ProofError::ValidationError("name was missing".to_string()));
        }

        if self.version.is_empty() {
            return Err(ProofError::ValidationError(
                "version was missing".to_string(),
            ));
        }

        if self.nonce.is_empty() || !self.nonce.chars().all(|c| c.is_ascii_digit()) {
            return Err(ProofError::ValidationError(
                "nonce must be a decimal string".to_string(),
            ));
        }

        if self.requested_attributes.is_empty() && self.requested_predicates.is_empty() {
            return Err(ProofError::ValidationError(
                "at least one attribute or predicate must be requested".to_string(),
            ));
        }

        for (referent, attribute) in self.requested_attributes.iter() {
            if referent.is_empty() {
                return Err(ProofError::ValidationError(
                    "attribute referent was missing".to_string(),
                ));
            }

            attribute.validate(referent)?;
        }

        for (referent, predicate) in self.requested_predicates.iter() {
            if referent.is_empty() || predicate.name.trim().is_empty() {
                return Err(ProofError::ValidationError(format!(
                    "predicate {} is incomplete",
                    referent
                )));
            }

            if self.requested_attributes.contains_key(referent) {
                return Err(ProofError::ValidationError(format!(
                    "referent {} is used by both an attribute and a predicate",
                    referent
                )));
            }
        }

        Ok(())
    }
}

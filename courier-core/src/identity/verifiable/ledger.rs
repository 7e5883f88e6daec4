//! Ledger identifier formats
//!
//! Schema ids look like `<issuer did>:2:<name>:<version>` and credential definition ids
//! like `<issuer did>:3:CL:<schema ref>:<tag>`, where the schema reference is either a
//! sequence number or a full schema id.

const SCHEMA_MARKER: &str = "2";
const CRED_DEF_MARKER: &str = "3";
const CRED_DEF_SIGNATURE_TYPE: &str = "CL";

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaId {
    pub issuer_did: String,
    pub name: String,
    pub version: String,
}

impl SchemaId {
    pub fn parse(id: &str) -> Option<Self> {
        let parts: Vec<&str> = id.split(':').collect();
        match parts.as_slice() {
            [issuer_did, SCHEMA_MARKER, name, version]
                if !issuer_did.is_empty() && !name.is_empty() && !version.is_empty() =>
            {
                Some(Self {
                    issuer_did: issuer_did.to_string(),
                    name: name.to_string(),
                    version: version.to_string(),
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CredentialDefinitionId {
    pub issuer_did: String,
    pub schema_ref: String,
    pub tag: String,
}

impl CredentialDefinitionId {
    pub fn parse(id: &str) -> Option<Self> {
        let parts: Vec<&str> = id.split(':').collect();
        if parts.len() < 5 {
            return None;
        }

        if parts[1] != CRED_DEF_MARKER || parts[2] != CRED_DEF_SIGNATURE_TYPE {
            return None;
        }

        let issuer_did = parts[0];
        let tag = parts[parts.len() - 1];
        let schema_ref = parts[3..parts.len() - 1].join(":");

        if issuer_did.is_empty() || schema_ref.is_empty() {
            return None;
        }

        Some(Self {
            issuer_did: issuer_did.to_string(),
            schema_ref,
            tag: tag.to_string(),
        })
    }
}

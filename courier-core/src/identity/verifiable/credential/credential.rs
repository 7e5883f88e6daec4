use std::collections::BTreeMap;

use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use super::types::{CredentialEntityAccessor, CredentialError};

/// `normalize_attr_name` lowercases an attribute name and strips every whitespace,
/// `"First Name"` and `"firstname"` are the same attribute
pub fn normalize_attr_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// `CredentialInfo` is a read-only summary of a wallet credential used for matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde")]
pub struct CredentialInfo {
    pub(crate) referent: String,

    #[serde(rename = "schemaId")]
    pub(crate) schema_id: String,

    #[serde(rename = "credDefId")]
    pub(crate) cred_def_id: String,

    pub(crate) attrs: BTreeMap<String, String>,

    #[serde(rename = "revRegId")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) rev_reg_id: Option<String>,
}

impl CredentialInfo {
    pub fn new(
        referent: String,
        schema_id: String,
        cred_def_id: String,
        attrs: BTreeMap<String, String>,
        rev_reg_id: Option<String>,
    ) -> Self {
        Self {
            referent,
            schema_id,
            cred_def_id,
            attrs,
            rev_reg_id,
        }
    }

    pub fn validate(&self) -> Result<(), CredentialError> {
        if self.referent.is_empty() {
            return Err(CredentialError::ValidationError(
                "referent was missing".to_string(),
            ));
        }

        if self.schema_id.is_empty() || self.cred_def_id.is_empty() {
            return Err(CredentialError::ValidationError(
                "schema_id or cred_def_id was missing".to_string(),
            ));
        }

        Ok(())
    }

    /// `get_attr_value` looks up an attribute by its normalized name
    pub fn get_attr_value(&self, name: &str) -> Option<String> {
        let wanted = normalize_attr_name(name);
        self.attrs
            .iter()
            .find(|(key, _)| normalize_attr_name(key) == wanted)
            .map(|(_, value)| value.to_owned())
    }

    pub fn has_attrs(&self, names: &[String]) -> bool {
        names.iter().all(|name| self.get_attr_value(name).is_some())
    }
}

impl ToJSON for CredentialInfo {
    fn to_json(&self) -> Result<String, BaseError> {
        let json_str =
            serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))?;

        Ok(json_str)
    }
}

impl TryInto<Vec<u8>> for CredentialInfo {
    type Error = CredentialError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        let json = serde_json::to_vec(&self)
            .map_err(|err| CredentialError::GenerateJSONError(err.to_string()))?;
        Ok(json)
    }
}

impl TryFrom<Vec<u8>> for CredentialInfo {
    type Error = CredentialError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let credential: CredentialInfo = serde_json::from_slice(&value)
            .map_err(|err| CredentialError::UnserializeError(err.to_string()))?;
        Ok(credential)
    }
}

impl CredentialEntityAccessor for CredentialInfo {
    fn get_referent(&self) -> String {
        self.referent.to_owned()
    }

    fn get_schema_id(&self) -> String {
        self.schema_id.to_owned()
    }

    fn get_cred_def_id(&self) -> String {
        self.cred_def_id.to_owned()
    }

    fn get_rev_reg_id(&self) -> Option<String> {
        self.rev_reg_id.to_owned()
    }

    fn get_attrs(&self) -> BTreeMap<String, String> {
        self.attrs.to_owned()
    }
}

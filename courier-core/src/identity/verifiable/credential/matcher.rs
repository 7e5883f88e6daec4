use std::collections::BTreeMap;

use rst_common::standard::serde::{self, Deserialize, Serialize};

use crate::identity::verifiable::proof::ProofRequestObject;

use super::types::{CredentialError, RepoBuilder};
use super::CredentialInfo;

/// `CredentialsForRequest` holds one bucket of eligible credentials per requested
/// attribute group and per requested predicate, keyed by referent
///
/// Buckets keep the wallet insertion order and may be empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(crate = "self::serde")]
pub struct CredentialsForRequest {
    pub attrs: BTreeMap<String, Vec<CredentialInfo>>,
    pub predicates: BTreeMap<String, Vec<CredentialInfo>>,
}

/// `Matcher` computes the eligible credentials for a proof request
#[derive(Clone)]
pub struct Matcher<TRepo>
where
    TRepo: RepoBuilder,
{
    repo: TRepo,
}

impl<TRepo> Matcher<TRepo>
where
    TRepo: RepoBuilder,
{
    pub fn new(repo: TRepo) -> Self {
        Self { repo }
    }

    /// `list_credentials_for_request` returns the eligible credentials of every requested
    /// attribute group and predicate, or only the ones of `referent` when it is given
    ///
    /// An attribute credential is eligible when its attribute names are a superset of the
    /// group's names and it satisfies at least one restriction clause. A predicate credential
    /// is eligible when it holds the predicate attribute under the same restriction rule.
    pub async fn list_credentials_for_request(
        &self,
        request: &ProofRequestObject,
        referent: Option<String>,
    ) -> Result<CredentialsForRequest, CredentialError> {
        if let Some(wanted) = &referent {
            if !request.requested_attributes.contains_key(wanted)
                && !request.requested_predicates.contains_key(wanted)
            {
                return Err(CredentialError::ValidationError(format!(
                    "unknown referent: {}",
                    wanted
                )));
            }
        }

        let selected = |key: &String| referent.as_ref().map_or(true, |wanted| wanted == key);
        let credentials = self.repo.list_credentials().await?;

        let mut output = CredentialsForRequest::default();
        for (key, attribute) in request.requested_attributes.iter() {
            if !selected(key) {
                continue;
            }

            let names = attribute.requested_names();
            let bucket = credentials
                .iter()
                .filter(|credential| {
                    credential.has_attrs(&names)
                        && attribute
                            .satisfies_restrictions(&credential.schema_id, &credential.cred_def_id)
                })
                .cloned()
                .collect();

            output.attrs.insert(key.to_owned(), bucket);
        }

        for (key, predicate) in request.requested_predicates.iter() {
            if !selected(key) {
                continue;
            }

            let bucket = credentials
                .iter()
                .filter(|credential| {
                    credential.get_attr_value(&predicate.name).is_some()
                        && predicate
                            .satisfies_restrictions(&credential.schema_id, &credential.cred_def_id)
                })
                .cloned()
                .collect();

            output.predicates.insert(key.to_owned(), bucket);
        }

        Ok(output)
    }
}

use rst_common::standard::async_trait::async_trait;

use prople_courier_core::identity::verifiable::credential::types::{
    CredentialEntityAccessor, CredentialError, RepoBuilder,
};
use prople_courier_core::identity::verifiable::credential::CredentialInfo;

use crate::db::{Store, MERGE_KEY_PREFIX};

const CREDENTIAL_KEY_ID: &str = "credential";
const CREDENTIAL_MERGE_KEY_ORDER: &str = "credentials";

/// `CredentialRepository` stores every credential under its referent and keeps the
/// referents in wallet insertion order inside a merge bucket
#[derive(Clone)]
pub struct CredentialRepository {
    db: Store,
}

impl CredentialRepository {
    pub fn new(db: Store) -> Self {
        Self { db }
    }

    fn build_credential_key(&self, val: String) -> String {
        format!("{}:{}", CREDENTIAL_KEY_ID, val)
    }

    fn build_order_key(&self) -> String {
        format!("{}{}:all", MERGE_KEY_PREFIX, CREDENTIAL_MERGE_KEY_ORDER)
    }
}

#[async_trait]
impl RepoBuilder for CredentialRepository {
    async fn save_credential(&self, credential: &CredentialInfo) -> Result<(), CredentialError> {
        credential.validate()?;

        let credential_key = self.build_credential_key(credential.get_referent());
        let exists = self
            .db
            .get(credential_key.clone())
            .await
            .map_err(|err| CredentialError::RepoError(err.to_string()))?
            .is_some();

        let credential_bytes: Vec<u8> = credential.to_owned().try_into()?;
        self.db
            .put(credential_key, credential_bytes)
            .await
            .map_err(|err| CredentialError::RepoError(err.to_string()))?;

        // an update keeps its original position
        if !exists {
            self.db
                .append(self.build_order_key(), credential.get_referent())
                .await
                .map_err(|err| CredentialError::RepoError(err.to_string()))?;
        }

        Ok(())
    }

    async fn get_credential_by_id(
        &self,
        referent: String,
    ) -> Result<CredentialInfo, CredentialError> {
        let value = self
            .db
            .get(self.build_credential_key(referent.clone()))
            .await
            .map_err(|err| CredentialError::RepoError(err.to_string()))?
            .ok_or(CredentialError::CredentialNotFound(referent))?;

        CredentialInfo::try_from(value)
    }

    async fn list_credentials(&self) -> Result<Vec<CredentialInfo>, CredentialError> {
        let order = self
            .db
            .bucket::<String>(self.build_order_key())
            .await
            .map_err(|err| CredentialError::RepoError(err.to_string()))?;

        let keys = order
            .into_items()
            .into_iter()
            .map(|referent| self.build_credential_key(referent))
            .collect();

        let values = self
            .db
            .multi_get_existing(keys)
            .await
            .map_err(|err| CredentialError::RepoError(err.to_string()))?;

        values
            .into_iter()
            .map(CredentialInfo::try_from)
            .collect()
    }
}

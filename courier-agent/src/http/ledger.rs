use reqwest::{Client, StatusCode};

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::de::DeserializeOwned;
use rst_common::standard::serde_json;
use rst_common::with_logging::log::debug;

use prople_courier_core::identity::verifiable::types::{
    CredentialDefinition, LedgerBuilder, LedgerError, RevocationRegistry, Schema,
};

const PATH_SCHEMAS: &str = "schemas";
const PATH_CREDENTIAL_DEFINITIONS: &str = "credential-definitions";
const PATH_REVOCATION_REGISTRIES: &str = "revocation-registries";

/// `HttpLedger` resolves public ledger objects through a read-only HTTP gateway
#[derive(Clone)]
pub struct HttpLedger {
    client: Client,
    base_url: String,
}

impl HttpLedger {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, id: String) -> Result<T, LedgerError> {
        let url = format!("{}/{}/{}", self.base_url, path, id);
        debug!("ledger: GET {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|err| LedgerError::LookupError(err.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(LedgerError::NotFound(id)),
            status if status.is_success() => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|err| LedgerError::LookupError(err.to_string()))?;

                serde_json::from_slice(&body)
                    .map_err(|err| LedgerError::LookupError(format!("{}: {}", id, err)))
            }
            status => Err(LedgerError::LookupError(format!(
                "{}: unexpected status {}",
                id, status
            ))),
        }
    }
}

#[async_trait]
impl LedgerBuilder for HttpLedger {
    async fn get_schema(&self, id: String) -> Result<Schema, LedgerError> {
        self.fetch(PATH_SCHEMAS, id).await
    }

    async fn get_credential_definition(
        &self,
        id: String,
    ) -> Result<CredentialDefinition, LedgerError> {
        self.fetch(PATH_CREDENTIAL_DEFINITIONS, id).await
    }

    async fn get_revocation_registry(
        &self,
        id: String,
    ) -> Result<RevocationRegistry, LedgerError> {
        self.fetch(PATH_REVOCATION_REGISTRIES, id).await
    }
}

use std::collections::BTreeMap;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, de::DeserializeOwned, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, Value};
use rst_common::with_logging::log::debug;

use prople_courier_core::identity::verifiable::credential::CredentialInfo;
use prople_courier_core::identity::verifiable::proof::types::{ProofError, ProverBuilder};
use prople_courier_core::identity::verifiable::proof::{
    PresentedProof, ProofRequestObject, RequestedProof,
};
use prople_courier_core::identity::verifiable::types::LedgerData;

use super::CONTENT_TYPE_JSON;

const PATH_CREATE: &str = "proofs/create";
const PATH_VERIFY: &str = "proofs/verify";

#[derive(Serialize)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
struct CreateProofPayload {
    request: ProofRequestObject,
    requested_proof: RequestedProof,
    credentials: BTreeMap<String, CredentialInfo>,
    ledger: LedgerData,
}

#[derive(Serialize)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
struct VerifyProofPayload {
    request: ProofRequestObject,
    proof: PresentedProof,
    ledger: LedgerData,
}

#[derive(Deserialize)]
#[serde(crate = "self::serde")]
struct CreateProofResponse {
    proof: Value,
}

#[derive(Deserialize)]
#[serde(crate = "self::serde")]
struct VerifyProofResponse {
    valid: bool,
}

/// `HttpProver` delegates the zero knowledge proof math to an external proof engine
#[derive(Clone)]
pub struct HttpProver {
    client: Client,
    base_url: String,
}

impl HttpProver {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    async fn call<P, R>(&self, path: &str, payload: &P) -> Result<R, ProofError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let body =
            serde_json::to_vec(payload).map_err(|err| ProofError::ProverError(err.to_string()))?;

        let response = self
            .client
            .post(url.as_str())
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body)
            .send()
            .await
            .map_err(|err| ProofError::ProverError(err.to_string()))?;

        let status = response.status();
        debug!("prover: POST {} -> {}", url, status);

        if !status.is_success() {
            return Err(ProofError::ProverError(format!(
                "{}: unexpected status {}",
                path, status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| ProofError::ProverError(err.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|err| ProofError::ProverError(err.to_string()))
    }
}

#[async_trait]
impl ProverBuilder for HttpProver {
    async fn create_proof(
        &self,
        request: ProofRequestObject,
        requested_proof: RequestedProof,
        credentials: BTreeMap<String, CredentialInfo>,
        ledger: LedgerData,
    ) -> Result<Value, ProofError> {
        let payload = CreateProofPayload {
            request,
            requested_proof,
            credentials,
            ledger,
        };

        let response: CreateProofResponse = self.call(PATH_CREATE, &payload).await?;
        Ok(response.proof)
    }

    async fn verify_proof(
        &self,
        request: ProofRequestObject,
        proof: PresentedProof,
        ledger: LedgerData,
    ) -> Result<bool, ProofError> {
        let payload = VerifyProofPayload {
            request,
            proof,
            ledger,
        };

        let response: VerifyProofResponse = self.call(PATH_VERIFY, &payload).await?;
        Ok(response.valid)
    }
}

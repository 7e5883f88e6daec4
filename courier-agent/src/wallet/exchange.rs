use rst_common::standard::async_trait::async_trait;

use prople_courier_core::identity::verifiable::exchange::types::{ExchangeError, RepoBuilder};
use prople_courier_core::identity::verifiable::exchange::{Proof, ProofRecord, ProofRequest};

use crate::db::{Store, MERGE_KEY_PREFIX};

const PROOF_REQUEST_KEY_ID: &str = "proof_request";
const PROOF_REQUEST_MERGE_KEY_ORDER: &str = "proof_requests";
const PROOF_KEY_ID: &str = "proof";
const RECORD_MERGE_KEY_REQUEST: &str = "proof_records";

#[derive(Clone)]
pub struct ExchangeRepository {
    db: Store,
}

impl ExchangeRepository {
    pub fn new(db: Store) -> Self {
        Self { db }
    }

    fn build_request_key(&self, val: String) -> String {
        format!("{}:{}", PROOF_REQUEST_KEY_ID, val)
    }

    fn build_request_order_key(&self) -> String {
        format!("{}{}:all", MERGE_KEY_PREFIX, PROOF_REQUEST_MERGE_KEY_ORDER)
    }

    fn build_proof_key(&self, val: String) -> String {
        format!("{}:{}", PROOF_KEY_ID, val)
    }

    fn build_records_key(&self, request_id: String) -> String {
        format!("{}{}:{}", MERGE_KEY_PREFIX, RECORD_MERGE_KEY_REQUEST, request_id)
    }
}

#[async_trait]
impl RepoBuilder for ExchangeRepository {
    async fn save_proof_request(&self, request: &ProofRequest) -> Result<(), ExchangeError> {
        let request_key = self.build_request_key(request.get_id());
        let exists = self
            .db
            .get(request_key.clone())
            .await
            .map_err(|err| ExchangeError::RepoError(err.to_string()))?
            .is_some();

        let request_bytes: Vec<u8> = request.to_owned().try_into()?;
        self.db
            .put(request_key, request_bytes)
            .await
            .map_err(|err| ExchangeError::RepoError(err.to_string()))?;

        if !exists {
            self.db
                .append(self.build_request_order_key(), request.get_id())
                .await
                .map_err(|err| ExchangeError::RepoError(err.to_string()))?;
        }

        Ok(())
    }

    async fn get_proof_request_by_id(&self, id: String) -> Result<ProofRequest, ExchangeError> {
        let value = self
            .db
            .get(self.build_request_key(id.clone()))
            .await
            .map_err(|err| ExchangeError::RepoError(err.to_string()))?
            .ok_or(ExchangeError::ProofRequestNotFound(id))?;

        ProofRequest::try_from(value)
    }

    async fn list_proof_requests(&self) -> Result<Vec<ProofRequest>, ExchangeError> {
        let order = self
            .db
            .bucket::<String>(self.build_request_order_key())
            .await
            .map_err(|err| ExchangeError::RepoError(err.to_string()))?;

        let keys = order
            .into_items()
            .into_iter()
            .map(|id| self.build_request_key(id))
            .collect();

        let values = self
            .db
            .multi_get_existing(keys)
            .await
            .map_err(|err| ExchangeError::RepoError(err.to_string()))?;

        values
            .into_iter()
            .map(ProofRequest::try_from)
            .collect()
    }

    async fn save_proof(&self, proof: &Proof) -> Result<(), ExchangeError> {
        let proof_bytes: Vec<u8> = proof.to_owned().try_into()?;
        self.db
            .put(self.build_proof_key(proof.get_id()), proof_bytes)
            .await
            .map_err(|err| ExchangeError::RepoError(err.to_string()))
    }

    async fn get_proof_by_id(&self, id: String) -> Result<Proof, ExchangeError> {
        let value = self
            .db
            .get(self.build_proof_key(id.clone()))
            .await
            .map_err(|err| ExchangeError::RepoError(err.to_string()))?
            .ok_or(ExchangeError::ProofNotFound(id))?;

        Proof::try_from(value)
    }

    async fn save_record(&self, record: &ProofRecord) -> Result<(), ExchangeError> {
        self.db
            .append(
                self.build_records_key(record.get_proof_request_id()),
                record.to_owned(),
            )
            .await
            .map_err(|err| ExchangeError::RepoError(err.to_string()))
    }

    async fn list_records_by_request(
        &self,
        request_id: String,
    ) -> Result<Vec<ProofRecord>, ExchangeError> {
        let records = self
            .db
            .bucket::<ProofRecord>(self.build_records_key(request_id))
            .await
            .map_err(|err| ExchangeError::RepoError(err.to_string()))?;

        Ok(records.into_items())
    }
}

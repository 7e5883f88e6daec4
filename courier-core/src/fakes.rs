//! In-memory collaborators shared by the unit tests of this crate

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use rst_common::standard::async_trait::async_trait;
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json::{self, json, Value};
use rst_common::with_tokio::tokio::sync::Mutex;

use crate::identity::connection::types::{
    ConnectionEntityAccessor, ConnectionError, RepoBuilder as ConnectionRepoBuilder,
};
use crate::identity::connection::Connection;
use crate::identity::verifiable::credential::types::{
    CredentialError, RepoBuilder as CredentialRepoBuilder,
};
use crate::identity::verifiable::credential::CredentialInfo;
use crate::identity::verifiable::exchange::types::{
    ExchangeError, RepoBuilder as ExchangeRepoBuilder,
};
use crate::identity::verifiable::exchange::{Proof, ProofRecord, ProofRequest};
use crate::identity::verifiable::proof::types::{ProofError, ProverBuilder};
use crate::identity::verifiable::proof::{PresentedProof, ProofRequestObject, RequestedProof};
use crate::identity::verifiable::types::{
    CredentialDefinition, LedgerBuilder, LedgerData, LedgerError, RevocationRegistry, Schema,
};
use crate::messaging::types::{
    CryptoBuilder, CryptoError, MessagingError, TransportBuilder, Verkey,
};

#[derive(Serialize, Deserialize)]
#[serde(crate = "self::serde")]
struct FakeSealed {
    mode: String,
    recipient: String,
    sender: Option<String>,
    body: String,
    sum: u32,
}

fn checksum(parts: &[&[u8]]) -> u32 {
    parts.iter().fold(0u32, |acc, part| {
        part.iter()
            .fold(acc, |acc, b| acc.wrapping_mul(31).wrapping_add(*b as u32))
    })
}

/// `FakeCrypto` is not encryption at all, it only binds a payload to its keys
/// with a checksum so tampering and misaddressing are detected
#[derive(Clone)]
pub struct FakeCrypto {
    owned: Arc<Vec<Verkey>>,
}

impl FakeCrypto {
    pub fn new(owned: Vec<Verkey>) -> Self {
        Self {
            owned: Arc::new(owned),
        }
    }

    fn seal(&self, mode: &str, recipient: Verkey, sender: Option<Verkey>, msg: Vec<u8>) -> Vec<u8> {
        let recipient = recipient.to_string();
        let sender = sender.map(|val| val.to_string());
        let body = BASE64.encode(msg);

        let sum = checksum(&[
            mode.as_bytes(),
            recipient.as_bytes(),
            sender.clone().unwrap_or_default().as_bytes(),
            body.as_bytes(),
        ]);

        let sealed = FakeSealed {
            mode: mode.to_string(),
            recipient,
            sender,
            body,
            sum,
        };

        serde_json::to_vec(&sealed).unwrap()
    }

    fn open(
        &self,
        mode: &str,
        recipient: Verkey,
        sender: Option<Verkey>,
        ciphertext: Vec<u8>,
    ) -> Result<Vec<u8>, CryptoError> {
        if !self.owned.contains(&recipient) {
            return Err(CryptoError::UnknownKey(recipient.to_string()));
        }

        let sealed: FakeSealed = serde_json::from_slice(&ciphertext)
            .map_err(|err| CryptoError::DecryptError(err.to_string()))?;

        let sum = checksum(&[
            sealed.mode.as_bytes(),
            sealed.recipient.as_bytes(),
            sealed.sender.clone().unwrap_or_default().as_bytes(),
            sealed.body.as_bytes(),
        ]);

        if sum != sealed.sum {
            return Err(CryptoError::DecryptError("checksum mismatch".to_string()));
        }

        if sealed.mode != mode
            || sealed.recipient != recipient.to_string()
            || sealed.sender != sender.map(|val| val.to_string())
        {
            return Err(CryptoError::DecryptError("key mismatch".to_string()));
        }

        BASE64
            .decode(sealed.body.as_bytes())
            .map_err(|err| CryptoError::DecryptError(err.to_string()))
    }
}

#[async_trait]
impl CryptoBuilder for FakeCrypto {
    async fn auth_encrypt(
        &self,
        sender: Verkey,
        recipient: Verkey,
        msg: Vec<u8>,
    ) -> Result<Vec<u8>, CryptoError> {
        if !self.owned.contains(&sender) {
            return Err(CryptoError::UnknownKey(sender.to_string()));
        }

        Ok(self.seal("auth", recipient, Some(sender), msg))
    }

    async fn auth_decrypt(
        &self,
        recipient: Verkey,
        sender: Verkey,
        ciphertext: Vec<u8>,
    ) -> Result<Vec<u8>, CryptoError> {
        self.open("auth", recipient, Some(sender), ciphertext)
    }

    async fn anon_encrypt(&self, recipient: Verkey, msg: Vec<u8>) -> Result<Vec<u8>, CryptoError> {
        Ok(self.seal("anon", recipient, None, msg))
    }

    async fn anon_decrypt(
        &self,
        recipient: Verkey,
        ciphertext: Vec<u8>,
    ) -> Result<Vec<u8>, CryptoError> {
        self.open("anon", recipient, None, ciphertext)
    }
}

#[derive(Clone, Debug)]
pub struct Delivery {
    pub uri: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// `FakeTransport` records every delivery and answers with a settable status
#[derive(Clone)]
pub struct FakeTransport {
    status: Arc<AtomicU16>,
    deliveries: Arc<Mutex<Vec<Delivery>>>,
}

impl FakeTransport {
    pub fn new(status: u16) -> Self {
        Self {
            status: Arc::new(AtomicU16::new(status)),
            deliveries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_status(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().await.clone()
    }

    pub async fn take_last(&self) -> Option<Delivery> {
        self.deliveries.lock().await.pop()
    }
}

#[async_trait]
impl TransportBuilder for FakeTransport {
    async fn post(
        &self,
        uri: String,
        content_type: String,
        body: Vec<u8>,
    ) -> Result<u16, MessagingError> {
        self.deliveries.lock().await.push(Delivery {
            uri,
            content_type,
            body,
        });

        Ok(self.status.load(Ordering::SeqCst))
    }
}

/// `FakeConnectionRepo` keeps connections in memory, in insertion order
#[derive(Clone)]
pub struct FakeConnectionRepo {
    connections: Arc<Mutex<Vec<Connection>>>,
}

impl FakeConnectionRepo {
    pub fn new() -> Self {
        Self::with(Vec::new())
    }

    pub fn with(connections: Vec<Connection>) -> Self {
        Self {
            connections: Arc::new(Mutex::new(connections)),
        }
    }
}

#[async_trait]
impl ConnectionRepoBuilder for FakeConnectionRepo {
    async fn save(&self, connection: &Connection) -> Result<(), ConnectionError> {
        let mut connections = self.connections.lock().await;
        match connections
            .iter_mut()
            .find(|val| val.get_id() == connection.get_id())
        {
            Some(existing) => *existing = connection.to_owned(),
            None => connections.push(connection.to_owned()),
        }

        Ok(())
    }

    async fn get_by_id(&self, id: String) -> Result<Connection, ConnectionError> {
        self.connections
            .lock()
            .await
            .iter()
            .find(|val| val.get_id() == id)
            .cloned()
            .ok_or_else(|| ConnectionError::ConnectionNotFound(id.clone()))
    }

    async fn find_by_their_verkey(
        &self,
        verkey: Verkey,
    ) -> Result<Option<Connection>, ConnectionError> {
        Ok(self
            .connections
            .lock()
            .await
            .iter()
            .find(|val| val.get_their_verkey() == Some(verkey.clone()))
            .cloned())
    }

    async fn find_by_my_verkey(
        &self,
        verkey: Verkey,
    ) -> Result<Option<Connection>, ConnectionError> {
        Ok(self
            .connections
            .lock()
            .await
            .iter()
            .find(|val| val.get_my_verkey() == verkey)
            .cloned())
    }
}

/// `FakeCredentialRepo` is an in-memory wallet keeping insertion order
#[derive(Clone)]
pub struct FakeCredentialRepo {
    credentials: Arc<Mutex<Vec<CredentialInfo>>>,
}

impl FakeCredentialRepo {
    pub fn with(credentials: Vec<CredentialInfo>) -> Self {
        Self {
            credentials: Arc::new(Mutex::new(credentials)),
        }
    }
}

#[async_trait]
impl CredentialRepoBuilder for FakeCredentialRepo {
    async fn save_credential(&self, credential: &CredentialInfo) -> Result<(), CredentialError> {
        self.credentials.lock().await.push(credential.to_owned());
        Ok(())
    }

    async fn get_credential_by_id(
        &self,
        referent: String,
    ) -> Result<CredentialInfo, CredentialError> {
        self.credentials
            .lock()
            .await
            .iter()
            .find(|val| val.referent == referent)
            .cloned()
            .ok_or_else(|| CredentialError::CredentialNotFound(referent.clone()))
    }

    async fn list_credentials(&self) -> Result<Vec<CredentialInfo>, CredentialError> {
        Ok(self.credentials.lock().await.clone())
    }
}

/// `FakeExchangeRepo` keeps requests, proofs and records in memory
#[derive(Clone, Default)]
pub struct FakeExchangeRepo {
    requests: Arc<Mutex<Vec<ProofRequest>>>,
    proofs: Arc<Mutex<Vec<Proof>>>,
    records: Arc<Mutex<Vec<ProofRecord>>>,
}

impl FakeExchangeRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn proofs(&self) -> Vec<Proof> {
        self.proofs.lock().await.clone()
    }
}

#[async_trait]
impl ExchangeRepoBuilder for FakeExchangeRepo {
    async fn save_proof_request(&self, request: &ProofRequest) -> Result<(), ExchangeError> {
        let mut requests = self.requests.lock().await;
        match requests.iter_mut().find(|val| val.get_id() == request.get_id()) {
            Some(existing) => *existing = request.to_owned(),
            None => requests.push(request.to_owned()),
        }

        Ok(())
    }

    async fn get_proof_request_by_id(&self, id: String) -> Result<ProofRequest, ExchangeError> {
        self.requests
            .lock()
            .await
            .iter()
            .find(|val| val.get_id() == id)
            .cloned()
            .ok_or_else(|| ExchangeError::ProofRequestNotFound(id.clone()))
    }

    async fn list_proof_requests(&self) -> Result<Vec<ProofRequest>, ExchangeError> {
        Ok(self.requests.lock().await.clone())
    }

    async fn save_proof(&self, proof: &Proof) -> Result<(), ExchangeError> {
        let mut proofs = self.proofs.lock().await;
        match proofs.iter_mut().find(|val| val.get_id() == proof.get_id()) {
            Some(existing) => *existing = proof.to_owned(),
            None => proofs.push(proof.to_owned()),
        }

        Ok(())
    }

    async fn get_proof_by_id(&self, id: String) -> Result<Proof, ExchangeError> {
        self.proofs
            .lock()
            .await
            .iter()
            .find(|val| val.get_id() == id)
            .cloned()
            .ok_or_else(|| ExchangeError::ProofNotFound(id.clone()))
    }

    async fn save_record(&self, record: &ProofRecord) -> Result<(), ExchangeError> {
        self.records.lock().await.push(record.to_owned());
        Ok(())
    }

    async fn list_records_by_request(
        &self,
        request_id: String,
    ) -> Result<Vec<ProofRecord>, ExchangeError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|val| val.get_proof_request_id() == request_id)
            .cloned()
            .collect())
    }
}

/// `FakeLedger` knows every schema and credential definition except the ones
/// containing `unknown`
#[derive(Clone, Default)]
pub struct FakeLedger;

#[async_trait]
impl LedgerBuilder for FakeLedger {
    async fn get_schema(&self, id: String) -> Result<Schema, LedgerError> {
        if id.contains("unknown") {
            return Err(LedgerError::NotFound(id));
        }

        Ok(Schema {
            id,
            name: "gvt".to_string(),
            version: "1.0".to_string(),
            attr_names: vec!["first_name".to_string(), "age".to_string()],
        })
    }

    async fn get_credential_definition(
        &self,
        id: String,
    ) -> Result<CredentialDefinition, LedgerError> {
        if id.contains("unknown") {
            return Err(LedgerError::NotFound(id));
        }

        Ok(CredentialDefinition {
            id,
            schema_id: String::new(),
            tag: "tag".to_string(),
            value: Value::Null,
        })
    }

    async fn get_revocation_registry(
        &self,
        id: String,
    ) -> Result<RevocationRegistry, LedgerError> {
        Err(LedgerError::NotFound(id))
    }
}

/// `FakeProver` signs a proof with the request nonce and accepts a proof
/// only when it carries the nonce of the request it is checked against
#[derive(Clone, Default)]
pub struct FakeProver;

#[async_trait]
impl ProverBuilder for FakeProver {
    async fn create_proof(
        &self,
        request: ProofRequestObject,
        _requested_proof: RequestedProof,
        credentials: BTreeMap<String, CredentialInfo>,
        _ledger: LedgerData,
    ) -> Result<Value, ProofError> {
        Ok(json!({
            "nonce": request.nonce,
            "credentials": credentials.len(),
        }))
    }

    async fn verify_proof(
        &self,
        request: ProofRequestObject,
        proof: PresentedProof,
        _ledger: LedgerData,
    ) -> Result<bool, ProofError> {
        Ok(proof.proof["nonce"] == json!(request.nonce))
    }
}

//! Admin JSON endpoints, meant to be exposed to the agent controller only
use std::collections::BTreeMap;
use std::future::Future;

use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::with_http_tokio::axum::extract::State;
use rst_common::with_http_tokio::axum::http::StatusCode;
use rst_common::with_http_tokio::axum::Json;
use rst_common::with_tokio::tokio;

use prople_courier_agent::common::types::AgentError;
use prople_courier_core::identity::connection::types::{DirectoryAPI, Endpoint};
use prople_courier_core::identity::connection::Connection;
use prople_courier_core::identity::verifiable::credential::types::RepoBuilder;
use prople_courier_core::identity::verifiable::credential::{CredentialInfo, CredentialsForRequest};
use prople_courier_core::identity::verifiable::exchange::types::{ExchangeAPI, ExchangeError};
use prople_courier_core::identity::verifiable::exchange::{Proof, ProofRecord, ProofRequest};
use prople_courier_core::identity::verifiable::proof::{
    AttributeInfo, PredicateInfo, RequestedCredentials,
};
use prople_courier_core::messaging::types::Verkey;

use crate::errors::ApiError;
use crate::svc::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// `detached` runs an exchange transition on its own task, a request timeout drops the
/// response but never a transition halfway through
async fn detached<F, T>(call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ExchangeError>> + Send + 'static,
    T: Send + 'static,
{
    let output = tokio::spawn(call)
        .await
        .map_err(|err| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;

    output.map_err(ApiError::from)
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
pub struct KeyCreated {
    pub verkey: Verkey,
    pub endpoint: Endpoint,
}

/// `SaveConnectionParams` describes either an invitation (local keys only) or an already
/// established pairwise connection when the counterparty fields are all given
#[derive(Deserialize, Debug)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
pub struct SaveConnectionParams {
    pub alias: String,
    pub my_did: String,
    pub my_verkey: Verkey,
    pub their_did: Option<String>,
    pub their_verkey: Option<Verkey>,
    pub endpoint: Option<Endpoint>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
pub struct SendProofRequestParams {
    pub connection_id: String,
    pub name: String,

    #[serde(default)]
    pub requested_attributes: BTreeMap<String, AttributeInfo>,

    #[serde(default)]
    pub requested_predicates: BTreeMap<String, PredicateInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
pub struct IdParams {
    pub id: String,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
pub struct CredentialsForRequestParams {
    pub id: String,
    pub referent: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
pub struct AcceptParams {
    pub id: String,
    pub requested_credentials: RequestedCredentials,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
pub struct RejectParams {
    pub id: String,
    pub reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(crate = "self::serde", rename_all = "camelCase")]
pub struct RecordsParams {
    pub request_id: String,
}

/// POST /admin/keys/create
pub async fn create_key(State(state): State<AppState>) -> ApiResult<KeyCreated> {
    let verkey = state
        .agent
        .keyring()
        .create_key()
        .await
        .map_err(AgentError::from)?;

    let endpoint = state.agent.local_endpoint(verkey.clone());
    Ok(Json(KeyCreated { verkey, endpoint }))
}

/// POST /admin/connections/save
pub async fn save_connection(
    State(state): State<AppState>,
    Json(params): Json<SaveConnectionParams>,
) -> ApiResult<Connection> {
    let connection = match (params.their_did, params.their_verkey, params.endpoint) {
        (Some(their_did), Some(their_verkey), Some(endpoint)) => Connection::established(
            params.alias,
            params.my_did,
            params.my_verkey,
            their_did,
            their_verkey,
            endpoint,
        ),
        (None, None, None) => Connection::new(params.alias, params.my_did, params.my_verkey),
        _ => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "theirDid, theirVerkey and endpoint must be given together",
            ))
        }
    };

    let saved = state
        .agent
        .directory()
        .save_connection(connection)
        .await
        .map_err(AgentError::from)?;

    Ok(Json(saved))
}

/// POST /admin/credentials/save
pub async fn save_credential(
    State(state): State<AppState>,
    Json(credential): Json<CredentialInfo>,
) -> ApiResult<CredentialInfo> {
    state
        .agent
        .credentials()
        .save_credential(&credential)
        .await
        .map_err(AgentError::from)?;

    Ok(Json(credential))
}

/// POST /admin/proof-requests/send
///
/// Creates the request then delivers it, a failed delivery leaves the request stored
/// in its created state so it can be sent again
pub async fn send_proof_request(
    State(state): State<AppState>,
    Json(params): Json<SendProofRequestParams>,
) -> ApiResult<ProofRequest> {
    let exchange = state.agent.exchange().clone();
    let sent = detached(async move {
        let request = exchange
            .create_proof_request(
                params.connection_id,
                params.name,
                params.requested_attributes,
                params.requested_predicates,
            )
            .await?;

        exchange.send_proof_request(request.get_id()).await
    })
    .await?;

    Ok(Json(sent))
}

/// POST /admin/proof-requests/get
pub async fn get_proof_request(
    State(state): State<AppState>,
    Json(params): Json<IdParams>,
) -> ApiResult<ProofRequest> {
    let request = state.agent.exchange().get_proof_request(params.id).await?;
    Ok(Json(request))
}

/// POST /admin/proof-requests/list
pub async fn list_proof_requests(State(state): State<AppState>) -> ApiResult<Vec<ProofRequest>> {
    let requests = state.agent.exchange().list_proof_requests().await?;
    Ok(Json(requests))
}

/// POST /admin/proof-requests/credentials
pub async fn list_credentials_for_request(
    State(state): State<AppState>,
    Json(params): Json<CredentialsForRequestParams>,
) -> ApiResult<CredentialsForRequest> {
    let credentials = state
        .agent
        .exchange()
        .list_credentials_for_request(params.id, params.referent)
        .await?;

    Ok(Json(credentials))
}

/// POST /admin/proof-requests/accept
pub async fn accept_proof_request(
    State(state): State<AppState>,
    Json(params): Json<AcceptParams>,
) -> ApiResult<Proof> {
    let exchange = state.agent.exchange().clone();
    let proof = detached(async move {
        exchange
            .accept_proof_request(params.id, params.requested_credentials)
            .await
    })
    .await?;

    Ok(Json(proof))
}

/// POST /admin/proof-requests/reject
pub async fn reject_proof_request(
    State(state): State<AppState>,
    Json(params): Json<RejectParams>,
) -> ApiResult<ProofRequest> {
    let exchange = state.agent.exchange().clone();
    let request =
        detached(async move { exchange.reject_proof_request(params.id, params.reason).await })
            .await?;

    Ok(Json(request))
}

/// POST /admin/proofs/get
pub async fn get_proof(
    State(state): State<AppState>,
    Json(params): Json<IdParams>,
) -> ApiResult<Proof> {
    let proof = state.agent.exchange().get_proof(params.id).await?;
    Ok(Json(proof))
}

/// POST /admin/proofs/resend
pub async fn resend_proof(
    State(state): State<AppState>,
    Json(params): Json<IdParams>,
) -> ApiResult<Proof> {
    let exchange = state.agent.exchange().clone();
    let proof = detached(async move { exchange.resend_proof(params.id).await }).await?;
    Ok(Json(proof))
}

/// POST /admin/proof-records/list
pub async fn list_proof_records(
    State(state): State<AppState>,
    Json(params): Json<RecordsParams>,
) -> ApiResult<Vec<ProofRecord>> {
    let records = state.agent.exchange().list_records(params.request_id).await?;
    Ok(Json(records))
}

use rst_common::standard::serde_json::json;
use rst_common::with_errors::thiserror::{self, Error};
use rst_common::with_http_tokio::axum::http::StatusCode;
use rst_common::with_http_tokio::axum::response::{IntoResponse, Response};
use rst_common::with_http_tokio::axum::Json;
use rst_common::with_logging::log::warn;

use prople_courier_agent::common::types::AgentError;
use prople_courier_core::identity::connection::types::ConnectionError;
use prople_courier_core::identity::verifiable::credential::types::CredentialError;
use prople_courier_core::identity::verifiable::exchange::types::ExchangeError;
use prople_courier_core::identity::verifiable::proof::types::ProofError;
use prople_courier_core::messaging::types::MessagingError;

#[derive(Debug, Error)]
pub enum CourierdError {
    #[error("agent error: {0}")]
    AgentError(#[from] AgentError),

    #[error("server error: {0}")]
    ServerError(String),
}

/// `ApiError` turns an agent failure into an HTTP response with a JSON error body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

fn messaging_status(err: &MessagingError) -> StatusCode {
    match err {
        MessagingError::TransportError(_) => StatusCode::BAD_GATEWAY,
        MessagingError::PackError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn exchange_status(err: &ExchangeError) -> StatusCode {
    match err {
        ExchangeError::ProofRequestNotFound(_) | ExchangeError::ProofNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ExchangeError::InvalidStateTransition(_) => StatusCode::CONFLICT,
        ExchangeError::ValidationError(_) | ExchangeError::UnsupportedMessage(_) => {
            StatusCode::BAD_REQUEST
        }
        ExchangeError::MessagingError(err) => messaging_status(err),
        ExchangeError::ConnectionError(err) => connection_status(err),
        ExchangeError::CredentialError(err) => credential_status(err),
        ExchangeError::ProofError(ProofError::LedgerResolutionError(_))
        | ExchangeError::ProofError(ProofError::ProverError(_)) => StatusCode::BAD_GATEWAY,
        ExchangeError::ProofError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn connection_status(err: &ConnectionError) -> StatusCode {
    match err {
        ConnectionError::ConnectionNotFound(_) => StatusCode::NOT_FOUND,
        ConnectionError::ValidationError(_) => StatusCode::BAD_REQUEST,
        ConnectionError::InvalidStateTransition(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn credential_status(err: &CredentialError) -> StatusCode {
    match err {
        CredentialError::CredentialNotFound(_) => StatusCode::NOT_FOUND,
        CredentialError::ValidationError(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        let status = match &err {
            AgentError::MessagingError(err) => messaging_status(err),
            AgentError::ExchangeError(err) => exchange_status(err),
            AgentError::ConnectionError(err) => connection_status(err),
            AgentError::CredentialError(err) => credential_status(err),
            AgentError::CryptoError(_) | AgentError::CommonError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self::new(status, err.to_string())
    }
}

impl From<ExchangeError> for ApiError {
    fn from(err: ExchangeError) -> Self {
        AgentError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!("request failed: {}", self.message);
        }

        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_test::table_test;

    #[test]
    fn test_status_mapping() {
        let table = vec![
            (
                AgentError::MessagingError(MessagingError::UnpackError("bad".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AgentError::ExchangeError(ExchangeError::MessagingError(
                    MessagingError::TransportError("down".to_string()),
                )),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AgentError::ExchangeError(ExchangeError::InvalidStateTransition(
                    "accepted".to_string(),
                )),
                StatusCode::CONFLICT,
            ),
            (
                AgentError::ExchangeError(ExchangeError::ProofRequestNotFound("id".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                AgentError::ExchangeError(ExchangeError::ProofError(
                    ProofError::IncompleteCredentialSelection("attr1".to_string()),
                )),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AgentError::ExchangeError(ExchangeError::ProofError(
                    ProofError::LedgerResolutionError("schema".to_string()),
                )),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AgentError::CredentialError(CredentialError::ValidationError(
                    "referent".to_string(),
                )),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (validator, input, expected) in table_test!(table) {
            let given = format!("{:?}", input);
            let api_error = ApiError::from(input);

            validator
                .given(&given)
                .when("map to http status")
                .then(&format!("it should be {}", expected))
                .assert_eq(expected, api_error.status);
        }
    }
}

use rst_common::with_http_tokio::axum::body::Bytes;
use rst_common::with_http_tokio::axum::extract::State;
use rst_common::with_http_tokio::axum::http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
use rst_common::with_http_tokio::axum::response::{IntoResponse, Response};
use rst_common::with_logging::log::{debug, warn};

use prople_courier_core::messaging::types::CONTENT_TYPE_AGENT_WIRE;

use crate::errors::ApiError;
use crate::svc::AppState;

/// `is_wire_content` accepts the wire content type, parameters like a charset are ignored
pub fn is_wire_content(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.split(';').next())
        .map(|val| val.trim().eq_ignore_ascii_case(CONTENT_TYPE_AGENT_WIRE))
        .unwrap_or(false)
}

/// POST /agent
///
/// Inbound wire endpoint, a routed message is answered with `202 Accepted`
pub async fn receive(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if !is_wire_content(&headers) {
        return ApiError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("expected content type {}", CONTENT_TYPE_AGENT_WIRE),
        )
        .into_response();
    }

    match state.agent.receive(body.to_vec()).await {
        Ok(outcome) => {
            debug!("inbound message routed: {:?}", outcome);
            StatusCode::ACCEPTED.into_response()
        }
        Err(err) => {
            warn!("inbound message dropped: {}", err);
            ApiError::from(err).into_response()
        }
    }
}

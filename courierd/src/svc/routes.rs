use std::time::Duration;

use rst_common::with_http_tokio::axum::routing::post;
use rst_common::with_http_tokio::axum::Router;
use rst_common::with_http_tokio::tower_http::timeout::TimeoutLayer;
use rst_common::with_http_tokio::tower_http::trace::TraceLayer;

use super::handlers::{admin, inbound};
use super::AppState;

/// `build_router` bounds every request with the configured `app.request_timeout_secs`
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.agent.config().app().get_request_timeout_secs());

    Router::new()
        .route("/agent", post(inbound::receive))
        .route("/admin/keys/create", post(admin::create_key))
        .route("/admin/connections/save", post(admin::save_connection))
        .route("/admin/credentials/save", post(admin::save_credential))
        .route("/admin/proof-requests/send", post(admin::send_proof_request))
        .route("/admin/proof-requests/get", post(admin::get_proof_request))
        .route("/admin/proof-requests/list", post(admin::list_proof_requests))
        .route(
            "/admin/proof-requests/credentials",
            post(admin::list_credentials_for_request),
        )
        .route("/admin/proof-requests/accept", post(admin::accept_proof_request))
        .route("/admin/proof-requests/reject", post(admin::reject_proof_request))
        .route("/admin/proofs/get", post(admin::get_proof))
        .route("/admin/proofs/resend", post(admin::resend_proof))
        .route("/admin/proof-records/list", post(admin::list_proof_records))
        .layer((
            TraceLayer::new_for_http(),
            TimeoutLayer::new(timeout),
        ))
        .with_state(state)
}

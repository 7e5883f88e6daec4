//! reqwest backed adapters: the wire transport, the ledger lookup and the proof engine
use std::time::Duration;

use reqwest::Client;

use crate::common::types::CommonError;

mod transport;
pub use transport::HttpTransport;

mod ledger;
pub use ledger::HttpLedger;

mod prover;
pub use prover::HttpProver;

pub const CONTENT_TYPE_JSON: &str = "application/json";

pub fn build_client(timeout: Duration) -> Result<Client, CommonError> {
    Client::builder()
        .use_rustls_tls()
        .timeout(timeout)
        .build()
        .map_err(|err| CommonError::HttpError(err.to_string()))
}

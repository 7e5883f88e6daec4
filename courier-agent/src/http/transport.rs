use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::debug;

use prople_courier_core::messaging::types::{MessagingError, TransportBuilder};

/// `HttpTransport` delivers wire envelopes with a plain HTTP POST
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TransportBuilder for HttpTransport {
    async fn post(
        &self,
        uri: String,
        content_type: String,
        body: Vec<u8>,
    ) -> Result<u16, MessagingError> {
        let response = self
            .client
            .post(uri.as_str())
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|err| MessagingError::TransportError(err.to_string()))?;

        let status = response.status().as_u16();
        debug!("transport: POST {} -> {}", uri, status);
        Ok(status)
    }
}

use std::time::Duration;

use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::{debug, info, warn};
use rst_common::with_tokio::tokio::time::timeout;

use crate::identity::connection::types::{ConnectionEntityAccessor, DirectoryAPI};
use crate::identity::connection::Connection;

use super::types::{
    CryptoBuilder, DispatcherAPI, MessagingError, TransportBuilder, Verkey,
    CONTENT_TYPE_AGENT_WIRE, DEFAULT_SEND_TIMEOUT_SECS, MAX_FORWARD_DEPTH,
};
use super::{AgentMessage, AgentWireMessage, Codec, ForwardMessage, MessageContext};

/// `Dispatcher` turns outbound messages into HTTP deliveries and inbound bytes
/// into [`MessageContext`]
#[derive(Clone)]
pub struct Dispatcher<TCrypto, TTransport, TDirectory>
where
    TCrypto: CryptoBuilder,
    TTransport: TransportBuilder,
    TDirectory: DirectoryAPI,
{
    codec: Codec<TCrypto>,
    transport: TTransport,
    directory: TDirectory,
    send_timeout: Duration,
}

impl<TCrypto, TTransport, TDirectory> Dispatcher<TCrypto, TTransport, TDirectory>
where
    TCrypto: CryptoBuilder,
    TTransport: TransportBuilder,
    TDirectory: DirectoryAPI,
{
    pub fn new(crypto: TCrypto, transport: TTransport, directory: TDirectory) -> Self {
        Self {
            codec: Codec::new(crypto),
            transport,
            directory,
            send_timeout: Duration::from_secs(DEFAULT_SEND_TIMEOUT_SECS),
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// `resolve_connection` is best-effort, a directory failure is logged and
    /// treated as an unknown sender
    async fn resolve_connection(
        &self,
        sender: Option<Verkey>,
        recipient: &Verkey,
    ) -> Option<Connection> {
        let sender = sender?;
        let resolved = self.directory.resolve_by_verkey(sender.clone()).await;

        match resolved {
            Ok(Some(connection)) if &connection.get_my_verkey() == recipient => Some(connection),
            Ok(Some(connection)) => {
                warn!(
                    "connection {} does not own recipient key {}",
                    connection.get_id(),
                    recipient
                );
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!("unable to resolve connection for {}: {}", sender, err);
                None
            }
        }
    }
}

#[async_trait]
impl<TCrypto, TTransport, TDirectory> DispatcherAPI for Dispatcher<TCrypto, TTransport, TDirectory>
where
    TCrypto: CryptoBuilder,
    TTransport: TransportBuilder,
    TDirectory: DirectoryAPI,
{
    async fn send(
        &self,
        message: AgentMessage,
        connection: Connection,
    ) -> Result<(), MessagingError> {
        let their_verkey = connection.get_their_verkey().ok_or(MessagingError::ValidationError(
            "connection has no counterparty verkey".to_string(),
        ))?;

        let endpoint = connection.get_endpoint().ok_or(MessagingError::ValidationError(
            "connection has no counterparty endpoint".to_string(),
        ))?;

        let payload = message.to_bytes()?;
        let inner = self
            .codec
            .pack(payload, their_verkey, Some(connection.get_my_verkey()))
            .await?;

        let inner_bytes: Vec<u8> = inner.try_into()?;
        let forward = ForwardMessage::new(endpoint.routing_verkey.clone(), &inner_bytes);
        let forward_bytes: Vec<u8> = forward.try_into()?;

        let outer = self
            .codec
            .pack(forward_bytes, endpoint.service_verkey.clone(), None)
            .await?;
        let outer_bytes: Vec<u8> = outer.try_into()?;

        debug!(
            "dispatching {} to {} over connection {}",
            message.message_type().name(),
            endpoint.uri,
            connection.get_id()
        );

        let status = timeout(
            self.send_timeout,
            self.transport.post(
                endpoint.uri.clone(),
                CONTENT_TYPE_AGENT_WIRE.to_string(),
                outer_bytes,
            ),
        )
        .await
        .map_err(|_| {
            MessagingError::TransportError(format!(
                "delivery to {} timed out after {}s",
                endpoint.uri,
                self.send_timeout.as_secs()
            ))
        })??;

        if !(200..300).contains(&status) {
            return Err(MessagingError::TransportError(format!(
                "delivery to {} failed with status {}",
                endpoint.uri, status
            )));
        }

        Ok(())
    }

    async fn receive(&self, raw: Vec<u8>) -> Result<MessageContext, MessagingError> {
        let envelope = AgentWireMessage::try_from(raw)?;

        let mut recipient = envelope.get_to().to_owned();
        let (mut plaintext, mut sender) = self.codec.unpack(&envelope).await?;

        let mut depth = 0;
        while let Some(forward) = ForwardMessage::detect(&plaintext) {
            if depth >= MAX_FORWARD_DEPTH {
                return Err(MessagingError::ForwardDepthExceeded(depth + 1));
            }

            depth += 1;
            let inner = forward.inner()?;
            recipient = inner.get_to().to_owned();
            (plaintext, sender) = self.codec.unpack(&inner).await?;
        }

        let message = AgentMessage::from_bytes(&plaintext)
            .map_err(|err| MessagingError::UnpackError(err.to_string()))?;

        if let AgentMessage::Unrecognized { type_tag, .. } = &message {
            info!("received unrecognized message type: {}", type_tag);
        }

        let connection = self.resolve_connection(sender.clone(), &recipient).await;
        Ok(MessageContext::new(
            message, plaintext, connection, sender, recipient,
        ))
    }
}

use std::time::Duration;

use rst_common::with_logging::log::{debug, info};

use rstdev_storage::engine::rocksdb::executor::Executor;

use prople_courier_core::identity::connection::types::{DirectoryAPI, Endpoint};
use prople_courier_core::identity::connection::{Connection, Directory};
use prople_courier_core::identity::verifiable::exchange::types::{ExchangeAPI, HandleOutcome};
use prople_courier_core::identity::verifiable::exchange::Usecase;
use prople_courier_core::messaging::types::{DispatcherAPI, Verkey};
use prople_courier_core::messaging::{AgentMessage, Dispatcher};

use crate::common::helpers;
use crate::common::types::{AgentError, CommonError};
use crate::config::{Config, Parser};
use crate::crypto::Keyring;
use crate::db::{Builder as DbBuilder, Store};
use crate::http::{build_client, HttpLedger, HttpProver, HttpTransport};
use crate::wallet::{
    ConnectionRepository, CredentialRepository, ExchangeRepository, KeyRepository,
};

pub type AgentDirectory = Directory<ConnectionRepository>;
pub type AgentDispatcher = Dispatcher<Keyring, HttpTransport, AgentDirectory>;
pub type AgentExchange = Usecase<
    ExchangeRepository,
    AgentDispatcher,
    AgentDirectory,
    CredentialRepository,
    HttpLedger,
    HttpProver,
>;

/// `ReceiveOutcome` tells what an inbound wire message changed in the wallet
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiveOutcome {
    Connection(Connection),
    Exchange(HandleOutcome),
}

/// `CourierAgent` assembles the courier protocol on top of the wallet storage, the local
/// keyring and the HTTP services declared in the configuration
#[derive(Clone)]
pub struct CourierAgent {
    config: Config,
    keyring: Keyring,
    credentials: CredentialRepository,
    directory: AgentDirectory,
    dispatcher: AgentDispatcher,
    exchange: AgentExchange,
}

impl CourierAgent {
    /// `new` parses and validates the given TOML file then opens the wallet
    pub fn new(conf_file: &str) -> Result<Self, AgentError> {
        let config = Parser::new(conf_file.to_string())
            .parse()
            .map_err(|err| CommonError::ConfigError(err.to_string()))?;

        helpers::validate(config.clone())?;

        let db = DbBuilder::new(config.clone()).build(|opts| {
            let wallet = opts.db().wallet.clone();
            (wallet.get_common(), wallet.get_db_options())
        })?;

        Self::from_executor(config, db)
    }

    pub fn from_executor(config: Config, db: Executor) -> Result<Self, AgentError> {
        let store = Store::new(db);
        let keyring = Keyring::new(KeyRepository::new(store.clone()));
        let credentials = CredentialRepository::new(store.clone());
        let directory = Directory::new(ConnectionRepository::new(store.clone()));

        let send_timeout = Duration::from_secs(config.agent().get_send_timeout_secs());
        let client = build_client(send_timeout)?;

        let dispatcher = Dispatcher::new(
            keyring.clone(),
            HttpTransport::new(client.clone()),
            directory.clone(),
        )
        .with_send_timeout(send_timeout);

        let services = config.services();
        let exchange = Usecase::new(
            ExchangeRepository::new(store),
            dispatcher.clone(),
            directory.clone(),
            credentials.clone(),
            HttpLedger::new(client.clone(), services.get_ledger_url()),
            HttpProver::new(client, services.get_prover_url()),
        );

        info!(
            "courier agent {} ready, endpoint: {}",
            config.agent().get_label(),
            config.agent().get_endpoint()
        );

        Ok(Self {
            config,
            keyring,
            credentials,
            directory,
            dispatcher,
            exchange,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    pub fn credentials(&self) -> &CredentialRepository {
        &self.credentials
    }

    pub fn directory(&self) -> &AgentDirectory {
        &self.directory
    }

    pub fn dispatcher(&self) -> &AgentDispatcher {
        &self.dispatcher
    }

    pub fn exchange(&self) -> &AgentExchange {
        &self.exchange
    }

    /// `local_endpoint` is the endpoint counterparties must use to reach the given key,
    /// the same key routes and serves
    pub fn local_endpoint(&self, verkey: Verkey) -> Endpoint {
        Endpoint::new(self.config.agent().get_endpoint(), verkey.clone(), verkey)
    }

    /// `receive` unpacks raw wire bytes and routes the message: connection requests go to
    /// the connection directory, everything else to the proof exchange
    pub async fn receive(&self, raw: Vec<u8>) -> Result<ReceiveOutcome, AgentError> {
        let context = self.dispatcher.receive(raw).await?;
        debug!("routing inbound {}", context.get_message_type());

        match context.get_message() {
            AgentMessage::ConnectionRequest(request) => {
                let connection = self
                    .directory
                    .accept_connection_request(context.get_recipient_verkey(), request.clone())
                    .await?;

                Ok(ReceiveOutcome::Connection(connection))
            }
            _ => {
                let outcome = self.exchange.handle(context).await?;
                Ok(ReceiveOutcome::Exchange(outcome))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rst_common::with_tokio::tokio;

    use prople_courier_core::identity::connection::types::ConnectionEntityAccessor;
    use prople_courier_core::identity::verifiable::exchange::types::ExchangeError;
    use prople_courier_core::messaging::message::ConnectionRequest;
    use prople_courier_core::messaging::types::MessagingError;
    use prople_courier_core::messaging::{Codec, ForwardMessage};

    use rand::rngs::OsRng;
    use x25519_dalek::{PublicKey, StaticSecret};

    use crate::common::helpers::testdb;
    use crate::crypto::encode_verkey;

    fn agent() -> CourierAgent {
        let config = testdb::global_db_parser().parse().unwrap();
        CourierAgent::from_executor(config, testdb::global_db_builder().clone()).unwrap()
    }

    /// packs the message the way a remote dispatcher does: authenticated for the
    /// recipient, forwarded, then anonymously sealed for the same key
    async fn wire(
        agent: &CourierAgent,
        message: AgentMessage,
        from: Verkey,
        to: Verkey,
    ) -> Vec<u8> {
        let codec = Codec::new(agent.keyring().clone());

        let inner = codec
            .pack(message.to_bytes().unwrap(), to.clone(), Some(from))
            .await
            .unwrap();
        let inner_bytes: Vec<u8> = inner.try_into().unwrap();

        let forward: Vec<u8> = ForwardMessage::new(to.clone(), &inner_bytes)
            .try_into()
            .unwrap();
        let outer = codec.pack(forward, to, None).await.unwrap();
        outer.try_into().unwrap()
    }

    mod expect_success {
        use super::*;

        #[tokio::test]
        async fn test_receive_connection_request() {
            let agent = agent();
            let bob_key = agent.keyring().create_key().await.unwrap();
            let alice_key = agent.keyring().create_key().await.unwrap();

            let invitation = Connection::new(
                "alice".to_string(),
                "did:bob".to_string(),
                bob_key.clone(),
            );
            agent
                .directory()
                .save_connection(invitation.clone())
                .await
                .unwrap();

            let request = ConnectionRequest::new(
                "alice".to_string(),
                "did:alice".to_string(),
                alice_key.clone(),
                Endpoint::new(
                    "http://alice/agent".to_string(),
                    alice_key.clone(),
                    alice_key.clone(),
                ),
            );

            let raw = wire(
                &agent,
                AgentMessage::ConnectionRequest(request),
                alice_key.clone(),
                bob_key,
            )
            .await;

            let outcome = agent.receive(raw).await.unwrap();
            match outcome {
                ReceiveOutcome::Connection(connection) => {
                    assert_eq!(connection.get_id(), invitation.get_id());
                    assert_eq!(connection.get_their_verkey(), Some(alice_key));
                }
                other => panic!("unexpected outcome: {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_local_endpoint() {
            let endpoint = agent().local_endpoint(Verkey::new("key"));
            assert_eq!(endpoint.uri, "http://localhost:8181/agent");
            assert_eq!(endpoint.routing_verkey, Verkey::new("key"));
            assert_eq!(endpoint.service_verkey, Verkey::new("key"));
        }
    }

    mod expect_errors {
        use super::*;

        #[tokio::test]
        async fn test_receive_garbage() {
            let result = agent().receive(b"not an envelope".to_vec()).await;
            assert!(matches!(result, Err(AgentError::MessagingError(_))));
        }

        #[tokio::test]
        async fn test_receive_for_unknown_key() {
            let agent = agent();
            let codec = Codec::new(agent.keyring().clone());
            let secret = StaticSecret::random_from_rng(OsRng);
            let stranger = encode_verkey(&PublicKey::from(&secret));

            let outer = codec.pack(b"{}".to_vec(), stranger, None).await.unwrap();
            let raw: Vec<u8> = outer.try_into().unwrap();

            let result = agent.receive(raw).await;
            assert!(matches!(
                result,
                Err(AgentError::MessagingError(MessagingError::UnpackError(_)))
            ));
        }

        #[tokio::test]
        async fn test_unsupported_message_without_connection() {
            let agent = agent();
            let bob_key = agent.keyring().create_key().await.unwrap();
            let alice_key = agent.keyring().create_key().await.unwrap();

            let message = AgentMessage::from_bytes(
                br#"{"@type": "https://example.org/unknown/1.0/ping"}"#,
            )
            .unwrap();

            let raw = wire(&agent, message, alice_key, bob_key).await;
            let result = agent.receive(raw).await;
            assert!(matches!(
                result,
                Err(AgentError::ExchangeError(ExchangeError::UnsupportedMessage(_)))
            ));
        }
    }
}

use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::{debug, info};

use crate::messaging::message::ConnectionRequest;
use crate::messaging::types::Verkey;

use super::types::{ConnectionEntityAccessor, ConnectionError, DirectoryAPI, RepoBuilder};
use super::Connection;

/// `Directory` maintains the pairwise connections of the local agent
#[derive(Clone)]
pub struct Directory<TRepo>
where
    TRepo: RepoBuilder,
{
    repo: TRepo,
}

impl<TRepo> Directory<TRepo>
where
    TRepo: RepoBuilder,
{
    pub fn new(repo: TRepo) -> Self {
        Self { repo }
    }

    fn repo(&self) -> TRepo {
        self.repo.to_owned()
    }
}

#[async_trait]
impl<TRepo> DirectoryAPI for Directory<TRepo>
where
    TRepo: RepoBuilder,
{
    async fn save_connection(&self, connection: Connection) -> Result<Connection, ConnectionError> {
        connection.validate()?;
        self.repo().save(&connection).await?;
        Ok(connection)
    }

    async fn get_connection(&self, id: String) -> Result<Connection, ConnectionError> {
        if id.is_empty() {
            return Err(ConnectionError::ValidationError(
                "id was missing".to_string(),
            ));
        }

        self.repo().get_by_id(id).await
    }

    async fn resolve_by_verkey(
        &self,
        verkey: Verkey,
    ) -> Result<Option<Connection>, ConnectionError> {
        if verkey.is_empty() {
            return Ok(None);
        }

        let connection = self.repo().find_by_their_verkey(verkey.clone()).await?;
        if connection.is_none() {
            debug!("no connection found for verkey: {}", verkey);
        }

        Ok(connection)
    }

    async fn accept_connection_request(
        &self,
        recipient: Verkey,
        request: ConnectionRequest,
    ) -> Result<Connection, ConnectionError> {
        request.validate()?;

        let mut connection = self
            .repo()
            .find_by_my_verkey(recipient.clone())
            .await?
            .ok_or(ConnectionError::ConnectionNotFound(format!(
                "no invitation owns key {}",
                recipient
            )))?;

        connection.negotiate(
            request.get_did(),
            request.get_verkey(),
            request.get_endpoint(),
        )?;

        self.repo().save(&connection).await?;
        info!(
            "connection {} negotiating with {}",
            connection.get_id(),
            request.get_label()
        );

        Ok(connection)
    }

    async fn complete_connection(&self, id: String) -> Result<Connection, ConnectionError> {
        let mut connection = self.get_connection(id).await?;
        connection.connect()?;

        self.repo().save(&connection).await?;
        Ok(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rst_common::with_tokio::tokio;

    use crate::fakes::FakeConnectionRepo;
    use crate::identity::connection::types::{Endpoint, State};

    fn endpoint() -> Endpoint {
        Endpoint::new(
            "http://bob.local/agent".to_string(),
            Verkey::new("bob-routing"),
            Verkey::new("bob-service"),
        )
    }

    fn invitation() -> Connection {
        Connection::new(
            "bob".to_string(),
            "did:prople:alice".to_string(),
            Verkey::new("alice-invite"),
        )
    }

    mod expect_success {
        use super::*;

        #[tokio::test]
        async fn test_accept_and_complete_connection() {
            let repo = FakeConnectionRepo::new();
            let directory = Directory::new(repo.clone());

            let saved = directory.save_connection(invitation()).await.unwrap();

            let request = ConnectionRequest::new(
                "bob".to_string(),
                "did:prople:bob".to_string(),
                Verkey::new("bob-key"),
                endpoint(),
            );

            let negotiating = directory
                .accept_connection_request(Verkey::new("alice-invite"), request)
                .await
                .unwrap();
            assert_eq!(negotiating.get_id(), saved.get_id());
            assert_eq!(negotiating.get_state(), State::Negotiating);

            let resolved = directory
                .resolve_by_verkey(Verkey::new("bob-key"))
                .await
                .unwrap();
            assert_eq!(resolved.map(|val| val.get_id()), Some(saved.get_id()));

            let connected = directory.complete_connection(saved.get_id()).await.unwrap();
            assert_eq!(connected.get_state(), State::Connected);
        }

        #[tokio::test]
        async fn test_resolve_unknown_verkey() {
            let directory = Directory::new(FakeConnectionRepo::new());
            let resolved = directory
                .resolve_by_verkey(Verkey::new("nobody"))
                .await
                .unwrap();
            assert!(resolved.is_none());
        }
    }

    mod expect_errors {
        use super::*;

        #[tokio::test]
        async fn test_accept_without_invitation() {
            let directory = Directory::new(FakeConnectionRepo::new());
            let request = ConnectionRequest::new(
                "bob".to_string(),
                "did:prople:bob".to_string(),
                Verkey::new("bob-key"),
                endpoint(),
            );

            let accepted = directory
                .accept_connection_request(Verkey::new("unknown"), request)
                .await;
            assert!(matches!(
                accepted,
                Err(ConnectionError::ConnectionNotFound(_))
            ));
        }

        #[tokio::test]
        async fn test_get_connection_missing_id() {
            let directory = Directory::new(FakeConnectionRepo::new());
            let found = directory.get_connection("".to_string()).await;
            assert!(matches!(found, Err(ConnectionError::ValidationError(_))));
        }

        #[tokio::test]
        async fn test_complete_invited_connection() {
            let directory = Directory::new(FakeConnectionRepo::new());
            let saved = directory.save_connection(invitation()).await.unwrap();

            let completed = directory.complete_connection(saved.get_id()).await;
            assert!(matches!(
                completed,
                Err(ConnectionError::InvalidStateTransition(_))
            ));
        }
    }
}

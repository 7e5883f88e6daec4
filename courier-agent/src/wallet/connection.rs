use rst_common::standard::async_trait::async_trait;

use prople_courier_core::identity::connection::types::{
    ConnectionEntityAccessor, ConnectionError, RepoBuilder,
};
use prople_courier_core::identity::connection::Connection;
use prople_courier_core::messaging::types::Verkey;

use crate::db::Store;

const CONNECTION_KEY_ID: &str = "connection";
const CONNECTION_KEY_THEIR_VERKEY: &str = "connection_their_verkey";
const CONNECTION_KEY_MY_VERKEY: &str = "connection_my_verkey";

#[derive(Clone)]
pub struct ConnectionRepository {
    db: Store,
}

impl ConnectionRepository {
    pub fn new(db: Store) -> Self {
        Self { db }
    }

    fn build_id_key(&self, val: String) -> String {
        format!("{}:{}", CONNECTION_KEY_ID, val)
    }

    fn build_their_verkey_key(&self, val: &Verkey) -> String {
        format!("{}:{}", CONNECTION_KEY_THEIR_VERKEY, val)
    }

    fn build_my_verkey_key(&self, val: &Verkey) -> String {
        format!("{}:{}", CONNECTION_KEY_MY_VERKEY, val)
    }

    async fn find_by_index(&self, key: String) -> Result<Option<Connection>, ConnectionError> {
        let id = self
            .db
            .get(key)
            .await
            .map_err(|err| ConnectionError::RepoError(err.to_string()))?;

        match id {
            Some(id_bytes) => {
                let id = String::from_utf8(id_bytes)
                    .map_err(|err| ConnectionError::UnserializeError(err.to_string()))?;

                match self.get_by_id(id).await {
                    Ok(connection) => Ok(Some(connection)),
                    Err(ConnectionError::ConnectionNotFound(_)) => Ok(None),
                    Err(err) => Err(err),
                }
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RepoBuilder for ConnectionRepository {
    async fn save(&self, connection: &Connection) -> Result<(), ConnectionError> {
        let connection_bytes: Vec<u8> = connection.to_owned().try_into()?;

        self.db
            .put(self.build_id_key(connection.get_id()), connection_bytes)
            .await
            .map_err(|err| ConnectionError::RepoError(err.to_string()))?;

        self.db
            .put(
                self.build_my_verkey_key(&connection.get_my_verkey()),
                connection.get_id().into_bytes(),
            )
            .await
            .map_err(|err| ConnectionError::RepoError(err.to_string()))?;

        if let Some(their_verkey) = connection.get_their_verkey() {
            self.db
                .put(
                    self.build_their_verkey_key(&their_verkey),
                    connection.get_id().into_bytes(),
                )
                .await
                .map_err(|err| ConnectionError::RepoError(err.to_string()))?;
        }

        Ok(())
    }

    async fn get_by_id(&self, id: String) -> Result<Connection, ConnectionError> {
        let value = self
            .db
            .get(self.build_id_key(id.clone()))
            .await
            .map_err(|err| ConnectionError::RepoError(err.to_string()))?
            .ok_or(ConnectionError::ConnectionNotFound(id))?;

        Connection::try_from(value)
    }

    async fn find_by_their_verkey(
        &self,
        verkey: Verkey,
    ) -> Result<Option<Connection>, ConnectionError> {
        self.find_by_index(self.build_their_verkey_key(&verkey))
            .await
    }

    async fn find_by_my_verkey(
        &self,
        verkey: Verkey,
    ) -> Result<Option<Connection>, ConnectionError> {
        self.find_by_index(self.build_my_verkey_key(&verkey)).await
    }
}

use prople_courier_core::messaging::types::{CryptoError, Verkey};

use crate::db::Store;

const KEY_SECRET_ID: &str = "key_secret";

/// Length of an X25519 secret scalar
pub const SECRET_KEY_LENGTH: usize = 32;

/// `KeyRepository` keeps the secret half of every key pair owned by this agent,
/// indexed by its verkey
#[derive(Clone)]
pub struct KeyRepository {
    db: Store,
}

impl KeyRepository {
    pub fn new(db: Store) -> Self {
        Self { db }
    }

    fn build_secret_key(&self, verkey: &Verkey) -> String {
        format!("{}:{}", KEY_SECRET_ID, verkey)
    }

    pub async fn save_secret(
        &self,
        verkey: &Verkey,
        secret: [u8; SECRET_KEY_LENGTH],
    ) -> Result<(), CryptoError> {
        self.db
            .put(self.build_secret_key(verkey), secret.to_vec())
            .await
            .map_err(|err| CryptoError::KeyError(err.to_string()))
    }

    pub async fn get_secret(
        &self,
        verkey: &Verkey,
    ) -> Result<[u8; SECRET_KEY_LENGTH], CryptoError> {
        let value = self
            .db
            .get(self.build_secret_key(verkey))
            .await
            .map_err(|err| CryptoError::KeyError(err.to_string()))?
            .ok_or(CryptoError::UnknownKey(verkey.to_string()))?;

        value
            .try_into()
            .map_err(|_| CryptoError::KeyError(format!("corrupted secret for {}", verkey)))
    }
}

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};

use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::debug;

use prople_courier_core::messaging::types::{CryptoBuilder, CryptoError, Verkey};

use crate::wallet::KeyRepository;

pub const AUTHCRYPT_INFO: &[u8] = b"prople-courier authcrypt v1";
pub const ANONCRYPT_INFO: &[u8] = b"prople-courier anoncrypt v1";

pub const NONCE_LENGTH: usize = 12;
const PUBLIC_KEY_LENGTH: usize = 32;
const TAG_LENGTH: usize = 16;

/// `Keyring` owns the agent X25519 key pairs, secrets are kept in the wallet
///
/// Both sealing modes derive an AES-256-GCM key with HKDF-SHA256 from an X25519 shared
/// secret, the public keys taking part in the exchange are bound as associated data:
///
/// - authcrypt output is `nonce || ciphertext`
/// - anoncrypt output is `ephemeral public key || nonce || ciphertext`
#[derive(Clone)]
pub struct Keyring {
    keys: KeyRepository,
}

impl Keyring {
    pub fn new(keys: KeyRepository) -> Self {
        Self { keys }
    }

    /// `create_key` generates a new key pair and returns its verkey
    pub async fn create_key(&self) -> Result<Verkey, CryptoError> {
        let secret = StaticSecret::random_from_rng(OsRng);
        let verkey = encode_verkey(&PublicKey::from(&secret));

        self.keys.save_secret(&verkey, secret.to_bytes()).await?;
        debug!("keyring: new key {}", verkey);
        Ok(verkey)
    }

    async fn secret(&self, verkey: &Verkey) -> Result<StaticSecret, CryptoError> {
        let bytes = self.keys.get_secret(verkey).await?;
        Ok(StaticSecret::from(bytes))
    }
}

pub fn encode_verkey(public: &PublicKey) -> Verkey {
    Verkey::new(URL_SAFE_NO_PAD.encode(public.as_bytes()))
}

pub fn decode_verkey(verkey: &Verkey) -> Result<PublicKey, CryptoError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(verkey.to_string())
        .map_err(|err| CryptoError::KeyError(format!("invalid verkey {}: {}", verkey, err)))?;

    let raw: [u8; PUBLIC_KEY_LENGTH] = bytes
        .try_into()
        .map_err(|_| CryptoError::KeyError(format!("invalid verkey length: {}", verkey)))?;

    Ok(PublicKey::from(raw))
}

fn derive_key(
    secret: &StaticSecret,
    public: &PublicKey,
    info: &[u8],
    aad: &[u8],
) -> Result<Aes256Gcm, CryptoError> {
    let shared = secret.diffie_hellman(public);
    let hk = Hkdf::<Sha256>::new(Some(aad), shared.as_bytes());

    let mut okm = [0u8; 32];
    hk.expand(info, &mut okm)
        .map_err(|err| CryptoError::KeyError(err.to_string()))?;

    Aes256Gcm::new_from_slice(&okm).map_err(|err| CryptoError::KeyError(err.to_string()))
}

fn seal(cipher: &Aes256Gcm, aad: &[u8], msg: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut nonce = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), Payload { msg, aad })
        .map_err(|err| CryptoError::EncryptError(err.to_string()))?;

    let mut output = nonce.to_vec();
    output.extend(ciphertext);
    Ok(output)
}

fn open(cipher: &Aes256Gcm, aad: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < NONCE_LENGTH + TAG_LENGTH {
        return Err(CryptoError::DecryptError("ciphertext too short".to_string()));
    }

    let (nonce, ciphertext) = sealed.split_at(NONCE_LENGTH);
    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|err| CryptoError::DecryptError(err.to_string()))
}

fn binding(first: &PublicKey, second: &PublicKey) -> Vec<u8> {
    [first.as_bytes().as_slice(), second.as_bytes().as_slice()].concat()
}

#[async_trait]
impl CryptoBuilder for Keyring {
    async fn auth_encrypt(
        &self,
        sender: Verkey,
        recipient: Verkey,
        msg: Vec<u8>,
    ) -> Result<Vec<u8>, CryptoError> {
        let sender_secret = self.secret(&sender).await?;
        let sender_public = PublicKey::from(&sender_secret);
        let recipient_public = decode_verkey(&recipient)?;

        let aad = binding(&sender_public, &recipient_public);
        let cipher = derive_key(&sender_secret, &recipient_public, AUTHCRYPT_INFO, &aad)?;
        seal(&cipher, &aad, &msg)
    }

    async fn auth_decrypt(
        &self,
        recipient: Verkey,
        sender: Verkey,
        ciphertext: Vec<u8>,
    ) -> Result<Vec<u8>, CryptoError> {
        let recipient_secret = self.secret(&recipient).await?;
        let recipient_public = PublicKey::from(&recipient_secret);
        let sender_public = decode_verkey(&sender)?;

        let aad = binding(&sender_public, &recipient_public);
        let cipher = derive_key(&recipient_secret, &sender_public, AUTHCRYPT_INFO, &aad)?;
        open(&cipher, &aad, &ciphertext)
    }

    async fn anon_encrypt(&self, recipient: Verkey, msg: Vec<u8>) -> Result<Vec<u8>, CryptoError> {
        let recipient_public = decode_verkey(&recipient)?;
        let ephemeral_secret = StaticSecret::random_from_rng(OsRng);
        let ephemeral_public = PublicKey::from(&ephemeral_secret);

        let aad = binding(&ephemeral_public, &recipient_public);
        let cipher = derive_key(&ephemeral_secret, &recipient_public, ANONCRYPT_INFO, &aad)?;

        let mut output = ephemeral_public.as_bytes().to_vec();
        output.extend(seal(&cipher, &aad, &msg)?);
        Ok(output)
    }

    async fn anon_decrypt(
        &self,
        recipient: Verkey,
        ciphertext: Vec<u8>,
    ) -> Result<Vec<u8>, CryptoError> {
        let recipient_secret = self.secret(&recipient).await?;
        let recipient_public = PublicKey::from(&recipient_secret);

        if ciphertext.len() < PUBLIC_KEY_LENGTH {
            return Err(CryptoError::DecryptError("ciphertext too short".to_string()));
        }

        let (ephemeral, sealed) = ciphertext.split_at(PUBLIC_KEY_LENGTH);
        let ephemeral_raw: [u8; PUBLIC_KEY_LENGTH] = ephemeral
            .try_into()
            .map_err(|_| CryptoError::DecryptError("invalid ephemeral key".to_string()))?;
        let ephemeral_public = PublicKey::from(ephemeral_raw);

        let aad = binding(&ephemeral_public, &recipient_public);
        let cipher = derive_key(&recipient_secret, &ephemeral_public, ANONCRYPT_INFO, &aad)?;
        open(&cipher, &aad, sealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rst_common::with_tokio::tokio;

    use crate::common::helpers::testdb;
    use crate::db::Store;

    fn keyring() -> Keyring {
        let store = Store::new(testdb::global_db_builder().clone());
        Keyring::new(KeyRepository::new(store))
    }

    fn foreign_verkey() -> Verkey {
        let secret = StaticSecret::random_from_rng(OsRng);
        encode_verkey(&PublicKey::from(&secret))
    }

    mod expect_success {
        use super::*;

        #[tokio::test]
        async fn test_verkey_format() {
            let verkey = keyring().create_key().await.unwrap();
            assert_eq!(verkey.to_string().len(), 43);
            assert!(!decode_verkey(&verkey).is_err());
        }

        #[tokio::test]
        async fn test_auth_roundtrip() {
            let keyring = keyring();
            let alice = keyring.create_key().await.unwrap();
            let bob = keyring.create_key().await.unwrap();

            let sealed = keyring
                .auth_encrypt(alice.clone(), bob.clone(), b"hello bob".to_vec())
                .await
                .unwrap();
            assert_ne!(sealed, b"hello bob".to_vec());

            let opened = keyring.auth_decrypt(bob, alice, sealed).await.unwrap();
            assert_eq!(opened, b"hello bob".to_vec());
        }

        #[tokio::test]
        async fn test_anon_roundtrip_uses_fresh_ephemeral_keys() {
            let keyring = keyring();
            let bob = keyring.create_key().await.unwrap();

            let first = keyring
                .anon_encrypt(bob.clone(), b"payload".to_vec())
                .await
                .unwrap();
            let second = keyring
                .anon_encrypt(bob.clone(), b"payload".to_vec())
                .await
                .unwrap();
            assert_ne!(first[..PUBLIC_KEY_LENGTH], second[..PUBLIC_KEY_LENGTH]);

            let opened = keyring.anon_decrypt(bob, first).await.unwrap();
            assert_eq!(opened, b"payload".to_vec());
        }
    }

    mod expect_errors {
        use super::*;

        #[tokio::test]
        async fn test_unknown_recipient() {
            let keyring = keyring();
            let stranger = foreign_verkey();

            let sealed = keyring
                .anon_encrypt(stranger.clone(), b"payload".to_vec())
                .await
                .unwrap();

            let result = keyring.anon_decrypt(stranger, sealed).await;
            assert!(matches!(result, Err(CryptoError::UnknownKey(_))));
        }

        #[tokio::test]
        async fn test_tampered_ciphertext() {
            let keyring = keyring();
            let alice = keyring.create_key().await.unwrap();
            let bob = keyring.create_key().await.unwrap();

            let mut sealed = keyring
                .auth_encrypt(alice.clone(), bob.clone(), b"hello".to_vec())
                .await
                .unwrap();
            let last = sealed.len() - 1;
            sealed[last] ^= 0x01;

            let result = keyring.auth_decrypt(bob, alice, sealed).await;
            assert!(matches!(result, Err(CryptoError::DecryptError(_))));
        }

        #[tokio::test]
        async fn test_wrong_sender() {
            let keyring = keyring();
            let alice = keyring.create_key().await.unwrap();
            let bob = keyring.create_key().await.unwrap();
            let mallory = keyring.create_key().await.unwrap();

            let sealed = keyring
                .auth_encrypt(alice, bob.clone(), b"hello".to_vec())
                .await
                .unwrap();

            let result = keyring.auth_decrypt(bob, mallory, sealed).await;
            assert!(matches!(result, Err(CryptoError::DecryptError(_))));
        }

        #[tokio::test]
        async fn test_invalid_verkey() {
            let result = keyring()
                .anon_encrypt(Verkey::new("not-a-key"), b"payload".to_vec())
                .await;
            assert!(matches!(result, Err(CryptoError::KeyError(_))));
        }
    }
}

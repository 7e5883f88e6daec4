use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;

use super::types::{CryptoBuilder, MessagingError, Verkey};

/// `AgentWireMessage` is the outer envelope sent over the wire
///
/// The `from` field only exists for authenticated encryption, an anonymously
/// encrypted envelope never carries it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde", deny_unknown_fields)]
pub struct AgentWireMessage {
    to: Verkey,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<Verkey>,

    message: String,
}

impl AgentWireMessage {
    pub fn get_to(&self) -> &Verkey {
        &self.to
    }

    pub fn get_from(&self) -> Option<&Verkey> {
        self.from.as_ref()
    }

    pub fn get_message(&self) -> &String {
        &self.message
    }

    pub fn ciphertext(&self) -> Result<Vec<u8>, MessagingError> {
        BASE64
            .decode(self.message.as_bytes())
            .map_err(|err| MessagingError::UnpackError(format!("invalid base64 message: {}", err)))
    }
}

impl TryInto<Vec<u8>> for AgentWireMessage {
    type Error = MessagingError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|err| MessagingError::PackError(err.to_string()))
    }
}

impl TryFrom<Vec<u8>> for AgentWireMessage {
    type Error = MessagingError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let envelope: AgentWireMessage = serde_json::from_slice(&value).map_err(|err| {
            MessagingError::UnpackError(format!("malformed wire message: {}", err))
        })?;

        if envelope.to.is_empty() {
            return Err(MessagingError::UnpackError(
                "wire message recipient was missing".to_string(),
            ));
        }

        Ok(envelope)
    }
}

/// `ForwardMessage` asks the receiving endpoint to relay the inner wire message
/// to the key given in `to`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "self::serde", deny_unknown_fields)]
pub struct ForwardMessage {
    to: Verkey,
    message: String,
}

impl ForwardMessage {
    pub fn new(to: Verkey, inner: &[u8]) -> Self {
        Self {
            to,
            message: BASE64.encode(inner),
        }
    }

    pub fn get_to(&self) -> &Verkey {
        &self.to
    }

    /// `detect` checks if a decrypted plaintext is a forward envelope
    ///
    /// Anything that is not exactly `{to, message}` is treated as a final message
    pub fn detect(plaintext: &[u8]) -> Option<Self> {
        serde_json::from_slice::<ForwardMessage>(plaintext).ok()
    }

    pub fn inner(&self) -> Result<AgentWireMessage, MessagingError> {
        let bytes = BASE64.decode(self.message.as_bytes()).map_err(|err| {
            MessagingError::UnpackError(format!("invalid base64 forward message: {}", err))
        })?;

        AgentWireMessage::try_from(bytes)
    }
}

impl TryInto<Vec<u8>> for ForwardMessage {
    type Error = MessagingError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(&self).map_err(|err| MessagingError::PackError(err.to_string()))
    }
}

/// `Codec` is the crypto envelope codec
///
/// It holds no state other than the crypto capability used to seal and open
/// each envelope layer
#[derive(Clone)]
pub struct Codec<TCrypto>
where
    TCrypto: CryptoBuilder,
{
    crypto: TCrypto,
}

impl<TCrypto> Codec<TCrypto>
where
    TCrypto: CryptoBuilder,
{
    pub fn new(crypto: TCrypto) -> Self {
        Self { crypto }
    }

    /// `pack` seals the payload for the recipient
    ///
    /// Given a sender key it uses authenticated encryption and sets `from`,
    /// otherwise the payload is anonymously encrypted and `from` is omitted
    pub async fn pack(
        &self,
        payload: Vec<u8>,
        recipient: Verkey,
        sender: Option<Verkey>,
    ) -> Result<AgentWireMessage, MessagingError> {
        if recipient.is_empty() {
            return Err(MessagingError::PackError(
                "recipient key was missing".to_string(),
            ));
        }

        let ciphertext = match sender.clone() {
            Some(sender_key) => self
                .crypto
                .auth_encrypt(sender_key, recipient.clone(), payload)
                .await
                .map_err(|err| MessagingError::PackError(err.to_string()))?,
            None => self
                .crypto
                .anon_encrypt(recipient.clone(), payload)
                .await
                .map_err(|err| MessagingError::PackError(err.to_string()))?,
        };

        Ok(AgentWireMessage {
            to: recipient,
            from: sender,
            message: BASE64.encode(ciphertext),
        })
    }

    /// `unpack` opens the envelope with the decrypt primitive selected by the
    /// presence of `from`, returning the plaintext and the sender key if any
    pub async fn unpack(
        &self,
        envelope: &AgentWireMessage,
    ) -> Result<(Vec<u8>, Option<Verkey>), MessagingError> {
        let ciphertext = envelope.ciphertext()?;

        match envelope.from.clone() {
            Some(sender) => {
                let plaintext = self
                    .crypto
                    .auth_decrypt(envelope.to.clone(), sender.clone(), ciphertext)
                    .await
                    .map_err(|err| MessagingError::UnpackError(err.to_string()))?;

                Ok((plaintext, Some(sender)))
            }
            None => {
                let plaintext = self
                    .crypto
                    .anon_decrypt(envelope.to.clone(), ciphertext)
                    .await
                    .map_err(|err| MessagingError::UnpackError(err.to_string()))?;

                Ok((plaintext, None))
            }
        }
    }
}

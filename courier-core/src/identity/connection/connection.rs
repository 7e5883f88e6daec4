use rst_common::standard::chrono::serde::ts_seconds;
use rst_common::standard::chrono::{DateTime, Utc};
use rst_common::standard::serde::{self, Deserialize, Serialize};
use rst_common::standard::serde_json;
use rst_common::standard::uuid::Uuid;

use rstdev_domain::entity::ToJSON;
use rstdev_domain::BaseError;

use crate::messaging::types::Verkey;

use super::types::{ConnectionEntityAccessor, ConnectionError, Endpoint, State};

/// `Connection` is a pairwise relationship between the local agent and a counterparty
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(crate = "self::serde")]
pub struct Connection {
    pub(crate) id: String,
    pub(crate) alias: String,

    #[serde(rename = "myDid")]
    pub(crate) my_did: String,

    #[serde(rename = "myVerkey")]
    pub(crate) my_verkey: Verkey,

    #[serde(rename = "theirDid")]
    pub(crate) their_did: Option<String>,

    #[serde(rename = "theirVerkey")]
    pub(crate) their_verkey: Option<Verkey>,

    pub(crate) endpoint: Option<Endpoint>,
    pub(crate) state: State,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "createdAt")]
    pub(crate) created_at: DateTime<Utc>,

    #[serde(with = "ts_seconds")]
    #[serde(rename = "updatedAt")]
    pub(crate) updated_at: DateTime<Utc>,
}

impl Connection {
    /// `new` creates an invitation, only the local keys are known at this point
    pub fn new(alias: String, my_did: String, my_verkey: Verkey) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            alias,
            my_did,
            my_verkey,
            their_did: None,
            their_verkey: None,
            endpoint: None,
            state: State::Invited,
            created_at: now,
            updated_at: now,
        }
    }

    /// `established` builds an already connected pairwise record, used when the handshake
    /// happened out of band
    pub fn established(
        alias: String,
        my_did: String,
        my_verkey: Verkey,
        their_did: String,
        their_verkey: Verkey,
        endpoint: Endpoint,
    ) -> Self {
        let mut connection = Self::new(alias, my_did, my_verkey);
        connection.their_did = Some(their_did);
        connection.their_verkey = Some(their_verkey);
        connection.endpoint = Some(endpoint);
        connection.state = State::Connected;
        connection
    }

    pub fn validate(&self) -> Result<(), ConnectionError> {
        if self.id.is_empty() {
            return Err(ConnectionError::ValidationError(
                "id was missing".to_string(),
            ));
        }

        if self.my_verkey.is_empty() {
            return Err(ConnectionError::ValidationError(
                "my_verkey was missing".to_string(),
            ));
        }

        if self.state != State::Invited
            && (self.their_verkey.is_none() || self.endpoint.is_none())
        {
            return Err(ConnectionError::ValidationError(
                "counterparty keys or endpoint were missing".to_string(),
            ));
        }

        Ok(())
    }

    pub fn negotiate(
        &mut self,
        their_did: String,
        their_verkey: Verkey,
        endpoint: Endpoint,
    ) -> Result<(), ConnectionError> {
        self.transition(State::Negotiating)?;

        self.their_did = Some(their_did);
        self.their_verkey = Some(their_verkey);
        self.endpoint = Some(endpoint);
        Ok(())
    }

    pub fn connect(&mut self) -> Result<(), ConnectionError> {
        self.transition(State::Connected)
    }

    fn transition(&mut self, next: State) -> Result<(), ConnectionError> {
        if !self.state.can_transition_to(&next) {
            return Err(ConnectionError::InvalidStateTransition(format!(
                "{:?} -> {:?}",
                self.state, next
            )));
        }

        self.state = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl ToJSON for Connection {
    fn to_json(&self) -> Result<String, BaseError> {
        let json_str =
            serde_json::to_string(&self).map_err(|err| BaseError::ToJSONError(err.to_string()))?;

        Ok(json_str)
    }
}

impl TryInto<Vec<u8>> for Connection {
    type Error = ConnectionError;

    fn try_into(self) -> Result<Vec<u8>, Self::Error> {
        let json = serde_json::to_vec(&self)
            .map_err(|err| ConnectionError::GenerateJSONError(err.to_string()))?;
        Ok(json)
    }
}

impl TryFrom<Vec<u8>> for Connection {
    type Error = ConnectionError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let connection: Connection = serde_json::from_slice(&value)
            .map_err(|err| ConnectionError::UnserializeError(err.to_string()))?;
        Ok(connection)
    }
}

impl ConnectionEntityAccessor for Connection {
    fn get_id(&self) -> String {
        self.id.to_owned()
    }

    fn get_alias(&self) -> String {
        self.alias.to_owned()
    }

    fn get_my_did(&self) -> String {
        self.my_did.to_owned()
    }

    fn get_my_verkey(&self) -> Verkey {
        self.my_verkey.to_owned()
    }

    fn get_their_did(&self) -> Option<String> {
        self.their_did.to_owned()
    }

    fn get_their_verkey(&self) -> Option<Verkey> {
        self.their_verkey.to_owned()
    }

    fn get_endpoint(&self) -> Option<Endpoint> {
        self.endpoint.to_owned()
    }

    fn get_state(&self) -> State {
        self.state.to_owned()
    }

    fn get_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn get_updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_test::table_test;

    fn endpoint() -> Endpoint {
        Endpoint::new(
            "http://localhost:8181/agent".to_string(),
            Verkey::new("routing"),
            Verkey::new("service"),
        )
    }

    #[test]
    fn test_state_transitions() {
        let table = vec![
            ((State::Invited, State::Negotiating), true),
            ((State::Negotiating, State::Connected), true),
            ((State::Invited, State::Connected), false),
            ((State::Connected, State::Invited), false),
            ((State::Connected, State::Negotiating), false),
            ((State::Negotiating, State::Negotiating), false),
        ];

        for (validator, (current, next), expected) in table_test!(table) {
            let actual = current.can_transition_to(&next);

            validator
                .given(&format!("{:?} -> {:?}", current, next))
                .when("can_transition_to")
                .then(&format!("it should be {}", expected))
                .assert_eq(expected, actual);
        }
    }

    #[test]
    fn test_negotiate_and_connect() {
        let mut connection = Connection::new(
            "bob".to_string(),
            "did:prople:alice".to_string(),
            Verkey::new("alice-key"),
        );
        assert_eq!(connection.get_state(), State::Invited);
        assert!(connection.connect().is_err());

        let negotiated = connection.negotiate(
            "did:prople:bob".to_string(),
            Verkey::new("bob-key"),
            endpoint(),
        );
        assert!(!negotiated.is_err());
        assert_eq!(connection.get_their_verkey(), Some(Verkey::new("bob-key")));

        assert!(!connection.connect().is_err());
        assert_eq!(connection.get_state(), State::Connected);

        let again = connection.negotiate(
            "did:prople:mallory".to_string(),
            Verkey::new("mallory-key"),
            endpoint(),
        );
        assert!(matches!(
            again,
            Err(ConnectionError::InvalidStateTransition(_))
        ));
        assert_eq!(connection.get_their_verkey(), Some(Verkey::new("bob-key")));
    }

    #[test]
    fn test_validate() {
        let connection = Connection::established(
            "bob".to_string(),
            "did:prople:alice".to_string(),
            Verkey::new("alice-key"),
            "did:prople:bob".to_string(),
            Verkey::new("bob-key"),
            endpoint(),
        );
        assert!(!connection.validate().is_err());

        let mut broken = connection.clone();
        broken.endpoint = None;
        assert!(matches!(
            broken.validate(),
            Err(ConnectionError::ValidationError(_))
        ));
    }

    #[test]
    fn test_bytes_conversion() {
        let connection = Connection::new(
            "bob".to_string(),
            "did:prople:alice".to_string(),
            Verkey::new("alice-key"),
        );

        let bytes: Vec<u8> = connection.clone().try_into().unwrap();
        let restored = Connection::try_from(bytes).unwrap();
        assert_eq!(restored.get_id(), connection.get_id());
        assert_eq!(restored.get_my_verkey(), connection.get_my_verkey());
        assert_eq!(restored.get_state(), State::Invited);
    }
}

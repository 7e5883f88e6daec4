use rst_common::standard::serde::{self, Deserialize};

use crate::common::types::{CommonError, ToValidate};

/// `Services` holds the base URLs of the ledger lookup and the proof engine
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(crate = "self::serde")]
pub struct Services {
    pub(super) ledger_url: String,
    pub(super) prover_url: String,
}

impl Services {
    pub fn get_ledger_url(&self) -> String {
        self.ledger_url.trim_end_matches('/').to_string()
    }

    pub fn get_prover_url(&self) -> String {
        self.prover_url.trim_end_matches('/').to_string()
    }
}

impl ToValidate for Services {
    fn validate(&self) -> Result<(), CommonError> {
        if self.ledger_url.is_empty() {
            return Err(CommonError::ValidationError(
                "config: services:ledger_url is missing".to_string(),
            ));
        }

        if self.prover_url.is_empty() {
            return Err(CommonError::ValidationError(
                "config: services:prover_url is missing".to_string(),
            ));
        }

        Ok(())
    }
}

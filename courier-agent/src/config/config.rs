use rst_common::standard::serde::{self, Deserialize};

use crate::common::types::{CommonError, ToValidate};

use super::{Agent, App, Database, Services};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(crate = "self::serde")]
pub struct Config {
    pub(super) database: Database,
    pub(super) app: App,
    pub(super) agent: Agent,
    pub(super) services: Services,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn db(&self) -> &Database {
        &self.database
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn services(&self) -> &Services {
        &self.services
    }
}

impl ToValidate for Config {
    fn validate(&self) -> Result<(), CommonError> {
        self.app.validate()?;
        self.agent.validate()?;
        self.services.validate()?;
        self.database.validate()?;

        if self.app.get_request_timeout_secs() <= self.agent.get_send_timeout_secs() {
            return Err(CommonError::ValidationError(format!(
                "config: app:request_timeout_secs ({}) must exceed agent:send_timeout_secs ({})",
                self.app.get_request_timeout_secs(),
                self.agent.get_send_timeout_secs()
            )));
        }

        Ok(())
    }
}

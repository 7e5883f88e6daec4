use rst_common::standard::serde::{self, Deserialize};

use prople_courier_core::messaging::types::DEFAULT_SEND_TIMEOUT_SECS;

use crate::common::types::{CommonError, ToValidate};

/// `Agent` describes how this agent presents itself to its counterparties
#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
pub struct Agent {
    pub(super) label: String,

    /// Public URI counterparties deliver wire envelopes to
    pub(super) endpoint: String,

    #[serde(default = "default_send_timeout")]
    pub(super) send_timeout_secs: u64,
}

fn default_send_timeout() -> u64 {
    DEFAULT_SEND_TIMEOUT_SECS
}

impl Agent {
    pub fn get_label(&self) -> String {
        self.label.to_owned()
    }

    pub fn get_endpoint(&self) -> String {
        self.endpoint.to_owned()
    }

    pub fn get_send_timeout_secs(&self) -> u64 {
        self.send_timeout_secs
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            label: "".to_string(),
            endpoint: "".to_string(),
            send_timeout_secs: DEFAULT_SEND_TIMEOUT_SECS,
        }
    }
}

impl ToValidate for Agent {
    fn validate(&self) -> Result<(), CommonError> {
        if self.label.is_empty() {
            return Err(CommonError::ValidationError(
                "config: agent:label is missing".to_string(),
            ));
        }

        if self.endpoint.is_empty() {
            return Err(CommonError::ValidationError(
                "config: agent:endpoint is missing".to_string(),
            ));
        }

        if self.send_timeout_secs == 0 {
            return Err(CommonError::ValidationError(
                "config: agent:send_timeout_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::helpers;
    use table_test::table_test;

    #[test]
    fn test_validation() {
        let table = vec![
            (("", "http://localhost:8181/agent", 30), Some("agent:label")),
            (("alice", "", 30), Some("agent:endpoint")),
            (("alice", "http://localhost:8181/agent", 0), Some("agent:send_timeout_secs")),
            (("alice", "http://localhost:8181/agent", 30), None),
        ];

        for (validator, input, expected) in table_test!(table) {
            let (label, endpoint, timeout) = input;
            let agent = Agent {
                label: label.to_string(),
                endpoint: endpoint.to_string(),
                send_timeout_secs: timeout,
            };

            let found = helpers::validate(agent).err().map(|err| err.to_string());
            let matched = match (expected, found) {
                (Some(fragment), Some(msg)) => msg.contains(fragment),
                (None, None) => true,
                _ => false,
            };

            validator
                .given(&format!("{:?}", input))
                .when("validate agent config")
                .then(&format!("it should fail on {:?}", expected))
                .assert_eq(true, matched);
        }
    }
}

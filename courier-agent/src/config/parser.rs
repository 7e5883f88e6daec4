use rstdev_config::format::use_toml;
use rstdev_config::parser::from_file;
use rstdev_config::{types::ConfigError, Builder};

use super::Config;

pub struct Parser {
    conf_file: String,
}

impl Parser {
    pub fn new(conf_file: String) -> Self {
        Self { conf_file }
    }

    pub fn parse(&self) -> Result<Config, ConfigError> {
        let config_toml = {
            let config_builder: Result<Config, ConfigError> =
                Builder::new(from_file(self.conf_file.to_owned()))
                    .fetch()?
                    .parse(use_toml);

            config_builder
        };

        config_toml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::helpers::{self, testdb::fixture_file};

    #[test]
    fn test_parse_config() {
        let parser = Parser::new(fixture_file("config.toml"));
        let config_builder = parser.parse();
        assert!(!config_builder.is_err());

        let config = config_builder.unwrap();
        assert!(!helpers::validate(config.clone()).is_err());

        let (host, port) = config.app().get_app_config();
        assert_eq!("localhost".to_string(), host);
        assert_eq!("8181".to_string(), port);

        assert_eq!(config.agent().get_label(), "courier-test");
        assert_eq!(config.agent().get_endpoint(), "http://localhost:8181/agent");
        assert_eq!(config.agent().get_send_timeout_secs(), 5);

        assert_eq!(config.services().get_ledger_url(), "http://localhost:9701");
        assert_eq!(config.services().get_prover_url(), "http://localhost:9702");

        let (dbpath, cfname) = config.db().wallet.get_common().get();
        assert_eq!("./wallet-test-storage".to_string(), dbpath);
        assert_eq!("wallet-cf".to_string(), cfname);

        let db_opts = config.db().wallet.get_db_options();
        assert_eq!(db_opts.get_set_wal_dir(), "./wallet-test-db-wal");
        assert!(db_opts.get_create_if_missing());
        assert!(db_opts.get_create_missing_columns());
        assert!(!db_opts.get_set_error_if_exists());
    }

    #[test]
    fn test_parse_missing_file() {
        let parser = Parser::new(fixture_file("missing.toml"));
        assert!(parser.parse().is_err());
    }
}

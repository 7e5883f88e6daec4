use super::types::{CommonError, ToValidate};

pub fn validate(validator: impl ToValidate) -> Result<(), CommonError> {
    validator.validate()
}

#[cfg(test)]
pub mod testdb {

    use once_cell::sync::OnceCell;
    use std::env;
    use std::path::PathBuf;

    use rstdev_storage::engine::rocksdb::executor::Executor;

    use crate::config::Parser as ConfigManager;
    use crate::db::Builder as DbBuilder;

    pub fn fixture_file(name: &str) -> String {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("src/config/fixtures");

        format!("{}/{}", path.display(), name)
    }

    pub fn global_db_parser() -> &'static ConfigManager {
        static INSTANCE: OnceCell<ConfigManager> = OnceCell::new();
        INSTANCE.get_or_init(|| ConfigManager::new(fixture_file("config.toml")))
    }

    /// `global_db_builder` opens the fixture wallet once per test binary, rocksdb refuses
    /// a second handle on the same path
    pub fn global_db_builder() -> &'static Executor {
        static INSTANCE: OnceCell<Executor> = OnceCell::new();
        INSTANCE.get_or_init(|| {
            let config = global_db_parser().parse().unwrap();

            let mut db_builder = DbBuilder::new(config);
            db_builder
                .build(|opts| {
                    let wallet = opts.db().wallet.clone();
                    (wallet.get_common(), wallet.get_db_options())
                })
                .unwrap()
        })
    }
}

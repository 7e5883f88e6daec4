mod database;
pub use database::{Database, RocksDBCommon, RocksDBOptions, Wallet};

mod app;
pub use app::App;

mod agent;
pub use agent::Agent;

mod services;
pub use services::Services;

mod config;
pub use config::Config;

mod parser;
pub use parser::Parser;

//! rocksdb backed implementations of the repository traits declared by `prople-courier-core`
mod connection;
pub use connection::ConnectionRepository;

mod credential;
pub use credential::CredentialRepository;

mod exchange;
pub use exchange::ExchangeRepository;

mod keys;
pub use keys::{KeyRepository, SECRET_KEY_LENGTH};

pub mod types;

pub mod ledger;
pub use ledger::{CredentialDefinitionId, SchemaId};

pub mod credential;
pub mod exchange;
pub mod proof;

pub mod types;

mod credential;
pub use credential::{normalize_attr_name, CredentialInfo};

mod matcher;
pub use matcher::{CredentialsForRequest, Matcher};

mod keyring;
pub use keyring::{decode_verkey, encode_verkey, Keyring};

pub mod connection;
pub mod verifiable;

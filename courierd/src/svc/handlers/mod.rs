pub mod admin;
pub mod inbound;

pub mod types;

mod connection;
pub use connection::Connection;

mod directory;
pub use directory::Directory;

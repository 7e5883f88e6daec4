mod state;
pub use state::AppState;

mod handlers;

mod routes;
pub use routes::build_router;

mod server;
pub use server::Server;

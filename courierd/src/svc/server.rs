use rst_common::with_http_tokio::axum;
use rst_common::with_logging::log::info;
use rst_common::with_tokio::tokio::net::TcpListener;
use rst_common::with_tracing::tracing_subscriber::{
    self, layer::SubscriberExt, util::SubscriberInitExt,
};

use prople_courier_agent::CourierAgent;

use crate::errors::CourierdError;

use super::{build_router, AppState};

pub struct Server {
    config: String,
}

impl Server {
    pub fn new(config: String) -> Server {
        Self { config }
    }

    pub async fn serve(&self) -> Result<(), CourierdError> {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    format!(
                        "{}=debug,prople_courier_agent=debug,prople_courier_core=debug,tower_http=debug,axum=trace",
                        env!("CARGO_CRATE_NAME")
                    )
                    .into()
                }),
            )
            .with(tracing_subscriber::fmt::layer().without_time())
            .init();

        let agent = CourierAgent::new(&self.config)?;
        let (host, port) = agent.config().app().get_app_config();
        let app = build_router(AppState::new(agent));

        let listener = TcpListener::bind(format!("{}:{}", host, port))
            .await
            .map_err(|err| CourierdError::ServerError(err.to_string()))?;

        info!("courierd listening on {}:{}", host, port);
        axum::serve(listener, app)
            .await
            .map_err(|err| CourierdError::ServerError(err.to_string()))
    }
}

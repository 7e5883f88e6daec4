use prople_courier_agent::CourierAgent;

#[derive(Clone)]
pub struct AppState {
    pub agent: CourierAgent,
}

impl AppState {
    pub fn new(agent: CourierAgent) -> Self {
        Self { agent }
    }
}

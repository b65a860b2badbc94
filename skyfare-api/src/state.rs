use skyfare_core::{AuthService, FlightService, TokenKeys};
use skyfare_store::Repositories;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub flights: FlightService,
    pub cors_origin: Option<String>,
}

impl AppState {
    pub fn new(repos: Repositories, tokens: TokenKeys) -> Self {
        Self {
            auth: AuthService::new(repos.users, tokens),
            flights: FlightService::new(repos.flights),
            cors_origin: None,
        }
    }

    pub fn with_cors_origin(mut self, origin: Option<String>) -> Self {
        self.cors_origin = origin;
        self
    }
}

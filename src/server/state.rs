use axum::extract::FromRef;

use crate::advisor::SuggestionService;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedSuggestionService = Arc<SuggestionService>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub service: GuardedSuggestionService,
}

impl ServerState {
    pub fn new(config: ServerConfig, service: GuardedSuggestionService) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            service,
        }
    }
}

impl FromRef<ServerState> for GuardedSuggestionService {
    fn from_ref(input: &ServerState) -> Self {
        input.service.clone()
    }
}

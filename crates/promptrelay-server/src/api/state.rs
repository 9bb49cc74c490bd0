use std::sync::Arc;
use std::time::Duration;

use promptrelay_ai::OllamaClient;

use crate::config::ServerConfig;
use crate::events::AssistantEvents;
use crate::middleware::{RateLimiter, SessionVerifier};

/// Application state shared across all API handlers.
///
/// Everything in here is either immutable configuration or internally
/// synchronized; per-request relay state never lives in it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub ollama: OllamaClient,
    pub events: AssistantEvents,
    pub verifier: Option<Arc<SessionVerifier>>,
    pub rate_limiter: Option<RateLimiter>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let mut ollama =
            OllamaClient::new(config.upstream_url.clone()).with_model(config.model.clone());
        if let Some(secs) = config.read_timeout_secs {
            ollama = ollama.with_read_timeout(Duration::from_secs(secs));
        }

        let verifier = config
            .auth_url
            .as_ref()
            .map(|url| Arc::new(SessionVerifier::new(url.clone())));
        let rate_limiter = RateLimiter::new(config.rate_limit_per_minute);

        Self {
            config: Arc::new(config),
            ollama,
            events: AssistantEvents::new(),
            verifier,
            rate_limiter,
        }
    }
}

//! PromptRelay server - SSE relay for the dashboard chat assistant.
//!
//! One streaming endpoint (`POST /api/chat`) bridges the local generation
//! backend's newline-delimited JSON onto server-sent events, plus the small
//! scaffold around it: session verification, rate limiting, an assistant
//! event feed and a health probe.

pub mod api;
pub mod config;
pub mod events;
pub mod middleware;

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use api::state::AppState;

#[derive(serde::Serialize)]
struct Health {
    status: String,
}

async fn health() -> axum::Json<Health> {
    axum::Json(Health {
        status: "promptrelay is working!".to_string(),
    })
}

/// Build the application router with all middleware attached.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(api::chat::chat))
        .route("/api/chat/events", get(api::chat::chat_events))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .layer(cors)
        .with_state(state)
}

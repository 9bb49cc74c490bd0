#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use promptrelay_server::api::state::AppState;
use promptrelay_server::config::ServerConfig;

pub const NDJSON: &str = "application/x-ndjson";

pub fn config_for(upstream_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        upstream_url: upstream_url.to_string(),
        model: "llama3.2".to_string(),
        max_prompt_len: 1500,
        read_timeout_secs: None,
        auth_url: None,
        rate_limit_per_minute: None,
    }
}

pub fn app_for(config: ServerConfig) -> Router {
    promptrelay_server::app(AppState::new(config))
}

pub fn chat_request(message: &str) -> Request<Body> {
    let body = serde_json::json!({ "message": message }).to_string();
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

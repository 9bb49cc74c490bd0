use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::api::state::AppState;

/// Narrow interface to the session/identity provider.
///
/// The provider owns tokens, sessions and password hashing; this side only
/// asks "is this bearer credential currently valid" and trusts the answer.
pub struct SessionVerifier {
    client: reqwest::Client,
    base_url: String,
}

impl SessionVerifier {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Ask the identity provider whether `token` belongs to a live session.
    pub async fn verify(&self, token: &str) -> Result<bool, reqwest::Error> {
        let url = format!(
            "{}/api/auth/get-session",
            self.base_url.trim_end_matches('/')
        );
        let response = self.client.get(url).bearer_auth(token).send().await?;
        Ok(response.status().is_success())
    }
}

/// Gate `/api` routes behind a valid session when a provider is configured.
/// Without one, every request passes through.
pub async fn auth_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if !path.starts_with("/api") {
        return next.run(req).await;
    }

    let Some(verifier) = state.verifier.clone() else {
        return next.run(req).await;
    };

    let token = match extract_bearer(req.headers().get(header::AUTHORIZATION)) {
        Some(token) => token,
        None => return unauthorized(),
    };

    match verifier.verify(&token).await {
        Ok(true) => next.run(req).await,
        Ok(false) => unauthorized(),
        Err(err) => {
            error!("session verification unavailable: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": "Session verification unavailable"})),
            )
                .into_response()
        }
    }
}

fn extract_bearer(header: Option<&HeaderValue>) -> Option<String> {
    let value = header?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(|token| token.trim().to_string())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Unauthorized"})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_accepts_both_casings() {
        let value = HeaderValue::from_static("Bearer token-1");
        assert_eq!(extract_bearer(Some(&value)), Some("token-1".to_string()));

        let value = HeaderValue::from_static("bearer token-2");
        assert_eq!(extract_bearer(Some(&value)), Some("token-2".to_string()));
    }

    #[test]
    fn test_extract_bearer_rejects_other_schemes() {
        let value = HeaderValue::from_static("Basic dXNlcjpwYXNz");
        assert_eq!(extract_bearer(Some(&value)), None);
        assert_eq!(extract_bearer(None), None);
    }
}

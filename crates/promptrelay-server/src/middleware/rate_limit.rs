use axum::{
    Json,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::api::state::AppState;

/// Sliding-window limiter for the chat endpoint.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<Window>>,
}

struct Window {
    limit: u64,
    period: Duration,
    hits: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(limit_per_minute: Option<u64>) -> Option<Self> {
        limit_per_minute.map(|limit| Self {
            inner: Arc::new(Mutex::new(Window {
                limit,
                period: Duration::from_secs(60),
                hits: VecDeque::new(),
            })),
        })
    }

    /// Record a hit if the window has room, or report that it is full.
    fn try_acquire(&self) -> bool {
        let mut window = self.inner.lock().expect("rate limit lock");
        let now = Instant::now();

        while let Some(oldest) = window.hits.front() {
            if now.duration_since(*oldest) > window.period {
                window.hits.pop_front();
            } else {
                break;
            }
        }

        if window.hits.len() as u64 >= window.limit {
            return false;
        }

        window.hits.push_back(now);
        true
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if req.method() == Method::POST && req.uri().path() == "/api/chat" {
        if let Some(limiter) = &state.rate_limiter
            && !limiter.try_acquire()
        {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"error": "Rate limit exceeded"})),
            )
                .into_response();
        }
    }

    next.run(req).await
}

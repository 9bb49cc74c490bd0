//! Assistant lifecycle event bus.
//!
//! The bus is an explicit emitter owned by the application root and handed
//! to whatever needs it through [`crate::api::state::AppState`] — there is
//! no process-global subscriber registry. Dashboard chrome subscribes via
//! `GET /api/chat/events` to observe assistant activity from anywhere.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const BUFFER_CAPACITY: usize = 256;

/// Lifecycle notifications for assistant streams.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum AssistantEvent {
    StreamStarted { prompt_chars: usize },
    StreamCompleted,
    StreamFailed { reason: String },
}

/// Broadcast emitter for [`AssistantEvent`]s.
#[derive(Debug, Clone)]
pub struct AssistantEvents {
    sender: broadcast::Sender<AssistantEvent>,
}

impl AssistantEvents {
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(BUFFER_CAPACITY);
        Self { sender }
    }

    /// Publish an event to current subscribers. Dropped if nobody listens.
    pub fn publish(&self, event: AssistantEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AssistantEvent> {
        self.sender.subscribe()
    }
}

impl Default for AssistantEvents {
    fn default() -> Self {
        Self::new()
    }
}

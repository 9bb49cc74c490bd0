//! PromptRelay AI - streaming client for the local generation backend
//!
//! This crate provides:
//! - A client for Ollama-compatible `/api/generate` endpoints
//! - Incremental decoding of newline-delimited JSON response bodies
//! - Error taxonomy shared with the HTTP layer

pub mod error;
mod http_client;
pub mod ollama;

pub use error::{AiError, Result};
pub use ollama::{FragmentStream, GenerateFragment, LineDecoder, OllamaClient};

//! Ollama-compatible generation endpoint client

mod client;
mod decode;

pub use client::{FragmentStream, GenerateFragment, OllamaClient};
pub use decode::LineDecoder;

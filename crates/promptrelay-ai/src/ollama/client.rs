//! Client for the local Ollama-compatible generation endpoint

use std::pin::Pin;
use std::time::Duration;

use async_stream::stream;
use futures::{Stream, StreamExt};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AiError, Result};
use crate::http_client::build_http_client;
use crate::ollama::decode::LineDecoder;

/// Boxed stream of decoded generation fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<GenerateFragment>> + Send>>;

const DEFAULT_MODEL: &str = "llama3.2";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// One incremental unit of generated text.
///
/// Decoded from one line of the backend's response body. Unknown fields
/// (timings, context, model name) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateFragment {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

/// Ollama generation client
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    url: String,
    model: String,
}

impl OllamaClient {
    /// Create a new client for the given `/api/generate` URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: build_http_client(None),
            url: url.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Abort reads that stall for longer than `timeout`
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_http_client(Some(timeout));
        self
    }

    /// Request a completion for `prompt` and stream back decoded fragments.
    ///
    /// Fails before any stream exists when the backend is unreachable or
    /// answers with a non-success status. Once the first `done` fragment is
    /// decoded the stream ends; dropping it closes the connection.
    pub async fn generate_stream(&self, prompt: &str) -> Result<FragmentStream> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: true,
        };
        let response = self.client.post(&self.url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(response_to_error(response).await);
        }

        Ok(Box::pin(fragment_stream(response.bytes_stream())))
    }
}

async fn response_to_error(response: Response) -> AiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    // Truncate error body to prevent leaking large or sensitive responses.
    const MAX_ERROR_BODY: usize = 512;
    let message = if body.len() > MAX_ERROR_BODY {
        let truncated: String = body.chars().take(MAX_ERROR_BODY).collect();
        format!("{}... [truncated]", truncated)
    } else {
        body
    };

    AiError::UpstreamStatus { status, message }
}

/// Decode a raw body stream into fragments, one JSON object per line.
///
/// The decoder accumulator carries partial lines across chunk boundaries.
/// Malformed lines are logged and skipped. Decoding stops after the first
/// `done` fragment; a read failure surfaces as a final `Err` item.
pub(crate) fn fragment_stream<S, B, E>(bytes: S) -> impl Stream<Item = Result<GenerateFragment>> + Send
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    stream! {
        let mut bytes = std::pin::pin!(bytes);
        let mut decoder = LineDecoder::new();

        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    yield Err(AiError::Stream(err.to_string()));
                    return;
                }
            };

            for line in decoder.push_chunk(chunk.as_ref()) {
                if let Some(fragment) = parse_fragment(&line) {
                    let done = fragment.done;
                    yield Ok(fragment);
                    if done {
                        return;
                    }
                }
            }
        }

        if let Some(line) = decoder.finish()
            && let Some(fragment) = parse_fragment(&line)
        {
            yield Ok(fragment);
        }
    }
}

fn parse_fragment(line: &str) -> Option<GenerateFragment> {
    match serde_json::from_str(line) {
        Ok(fragment) => Some(fragment),
        Err(err) => {
            warn!(%err, line, "skipping malformed generation line");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(
        parts: Vec<std::result::Result<&'static [u8], std::io::Error>>,
    ) -> impl Stream<Item = std::result::Result<&'static [u8], std::io::Error>> + Send + 'static {
        stream::iter(parts)
    }

    #[tokio::test]
    async fn test_fragments_across_chunk_boundary() {
        let body = chunks(vec![
            Ok(b"{\"response\":\"He" as &[u8]),
            Ok(b"l\",\"done\":false}\n{\"response\":\"lo\",\"done\":false}\n"),
            Ok(b"{\"response\":\"\",\"done\":true}\n"),
        ]);

        let fragments: Vec<_> = fragment_stream(body).collect().await;
        let texts: Vec<_> = fragments
            .iter()
            .map(|f| f.as_ref().unwrap().response.clone())
            .collect();
        assert_eq!(texts, vec!["Hel", "lo", ""]);
        assert!(fragments.last().unwrap().as_ref().unwrap().done);
    }

    #[tokio::test]
    async fn test_malformed_line_skipped() {
        let body = chunks(vec![Ok(
            b"{\"response\":\"A\",\"done\":false}\nnot json\n{\"response\":\"B\",\"done\":true}\n"
                as &[u8],
        )]);

        let fragments: Vec<_> = fragment_stream(body).collect().await;
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].as_ref().unwrap().response, "A");
        assert_eq!(fragments[1].as_ref().unwrap().response, "B");
    }

    #[tokio::test]
    async fn test_stops_after_done_fragment() {
        let body = chunks(vec![Ok(
            b"{\"response\":\"x\",\"done\":true}\n{\"response\":\"late\",\"done\":false}\n"
                as &[u8],
        )]);

        let fragments: Vec<_> = fragment_stream(body).collect().await;
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].as_ref().unwrap().done);
    }

    #[tokio::test]
    async fn test_read_error_surfaces_as_stream_error() {
        let body = chunks(vec![
            Ok(b"{\"response\":\"x\",\"done\":false}\n" as &[u8]),
            Err(std::io::Error::other("connection reset")),
        ]);

        let fragments: Vec<_> = fragment_stream(body).collect().await;
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].as_ref().unwrap().response, "x");
        assert!(matches!(fragments[1], Err(AiError::Stream(_))));
    }

    #[tokio::test]
    async fn test_trailing_line_without_newline() {
        let body = chunks(vec![Ok(b"{\"response\":\"tail\",\"done\":false}" as &[u8])]);

        let fragments: Vec<_> = fragment_stream(body).collect().await;
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].as_ref().unwrap().response, "tail");
    }
}

use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::abort::AbortSignal;
use crate::client::OllamaClient;
use crate::error::{TamaAiError, TamaAiErrorCode};
use crate::ndjson::NdjsonDecoder;
use crate::types::{ChatChunk, ChatRequest};

/// How a dispatch that produced a `Complete` event came to an end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEnd {
    Finished,
    Cancelled,
    /// The body stopped early: an undecodable chunk, an in-band error, or a
    /// transport error after the status line. Carries the reason.
    Truncated(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub elapsed: Duration,
    pub end: StreamEnd,
}

impl Completion {
    pub fn degraded(&self) -> Option<&str> {
        match &self.end {
            StreamEnd::Truncated(reason) => Some(reason.as_str()),
            _ => None,
        }
    }
}

/// Everything a dispatch reports back to the event loop.
///
/// A dispatch emits zero or more `Partial` events followed by exactly one
/// `Complete` or `Failure`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchEvent {
    /// Full accumulated assistant text so far, never a delta.
    Partial(String),
    Complete(Completion),
    Failure(String),
}

/// Performs one streaming `/api/chat` exchange. Never retries.
pub async fn stream_chat<F>(
    client: &OllamaClient,
    request: &ChatRequest,
    signal: AbortSignal,
    mut on_event: F,
) where
    F: FnMut(DispatchEvent),
{
    let started = Instant::now();
    info!(
        model = %request.model,
        messages = request.messages.len(),
        "dispatching chat request"
    );

    let body = match serde_json::to_vec(request) {
        Ok(body) => body,
        Err(error) => {
            let error = TamaAiError::new(
                TamaAiErrorCode::Encode,
                format!("failed to marshal request: {error}"),
            );
            on_event(DispatchEvent::Failure(error.to_string()));
            return;
        }
    };

    let send = client
        .http()
        .post(client.chat_url())
        .header("Content-Type", "application/json")
        .body(body)
        .send();
    let response = tokio::select! {
        biased;
        _ = signal.cancelled() => {
            info!("chat request cancelled before response headers");
            on_event(DispatchEvent::Complete(Completion {
                text: String::new(),
                elapsed: started.elapsed(),
                end: StreamEnd::Cancelled,
            }));
            return;
        }
        result = send => result,
    };

    let response = match response {
        Ok(response) => response,
        Err(error) => {
            let error = TamaAiError::transport(format!("failed to send request: {error}"));
            warn!(%error, "chat request failed");
            on_event(DispatchEvent::Failure(error.to_string()));
            return;
        }
    };

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_string());
        let error = TamaAiError::http(status, &body);
        warn!(%error, "chat request rejected");
        on_event(DispatchEvent::Failure(error.to_string()));
        return;
    }

    let mut body = response.bytes_stream();
    let mut decoder = NdjsonDecoder::new();
    let mut accumulated = String::new();

    let end = 'read: loop {
        let next = tokio::select! {
            biased;
            _ = signal.cancelled() => break 'read StreamEnd::Cancelled,
            next = body.next() => next,
        };

        let lines = match next {
            Some(Ok(bytes)) => decoder.push(&bytes),
            Some(Err(error)) => {
                break 'read StreamEnd::Truncated(format!("stream read failed: {error}"));
            }
            None => {
                if let Some(tail) = decoder.finish() {
                    if let Err(reason) = apply_line(&tail, &mut accumulated, &mut on_event) {
                        break 'read StreamEnd::Truncated(reason);
                    }
                }
                break 'read StreamEnd::Finished;
            }
        };

        for line in lines {
            if let Err(reason) = apply_line(&line, &mut accumulated, &mut on_event) {
                break 'read StreamEnd::Truncated(reason);
            }
        }
    };

    let text = match end {
        StreamEnd::Cancelled => accumulated,
        _ => accumulated.trim().to_string(),
    };
    match &end {
        StreamEnd::Finished => info!(chars = text.len(), "chat stream finished"),
        StreamEnd::Cancelled => info!(chars = text.len(), "chat stream cancelled"),
        StreamEnd::Truncated(reason) => warn!(%reason, "chat stream ended early"),
    }
    on_event(DispatchEvent::Complete(Completion {
        text,
        elapsed: started.elapsed(),
        end,
    }));
}

fn apply_line<F>(line: &[u8], accumulated: &mut String, on_event: &mut F) -> Result<(), String>
where
    F: FnMut(DispatchEvent),
{
    let line = std::str::from_utf8(line).map_err(|error| format!("invalid chunk: {error}"))?;
    let chunk: ChatChunk =
        serde_json::from_str(line).map_err(|error| format!("invalid chunk: {error}"))?;
    if let Some(error) = chunk.error {
        return Err(format!("server error: {error}"));
    }

    let fragment = chunk.content();
    debug!(len = fragment.len(), done = chunk.done, "chat chunk");
    if fragment.is_empty() {
        return Ok(());
    }
    accumulated.push_str(fragment);
    on_event(DispatchEvent::Partial(accumulated.clone()));
    Ok(())
}

//! Ollama chat transport: wire types, NDJSON stream decoding, and the
//! cancellable streaming dispatcher.

mod abort;
mod chat_stream;
mod client;
mod error;
mod models;
mod ndjson;
mod types;

pub use abort::{AbortController, AbortSignal};
pub use chat_stream::{Completion, DispatchEvent, StreamEnd, stream_chat};
pub use client::{DEFAULT_BASE_URL, DEFAULT_MODEL, OllamaClient};
pub use error::{TamaAiError, TamaAiErrorCode};
pub use ndjson::NdjsonDecoder;
pub use types::{ChatChunk, ChatMessage, ChatRequest, ChunkMessage, Role, RunningModel, RunningModels};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    pub fn streaming(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
        }
    }
}

/// Only `content` is consumed; the role is kept as sent so that roles this
/// client never produces (`tool`, ...) still decode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ChunkMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: String,
}

/// One line of the `/api/chat` NDJSON reply.
///
/// `done` is advisory only; end of body is what completes a dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatChunk {
    pub fn content(&self) -> &str {
        self.message
            .as_ref()
            .map(|message| message.content.as_str())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RunningModel {
    pub name: String,
}

/// Reply of `GET /api/ps`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RunningModels {
    #[serde(default)]
    pub models: Vec<RunningModel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_request_serializes_wire_shape() {
        let request = ChatRequest::streaming(
            "llama3",
            vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello")],
        );
        let value = serde_json::to_value(&request).expect("encode request");
        assert_eq!(
            value,
            serde_json::json!({
                "model": "llama3",
                "messages": [
                    {"role": "user", "content": "Hi"},
                    {"role": "assistant", "content": "Hello"}
                ],
                "stream": true
            })
        );
    }

    #[test]
    fn chunk_without_message_has_empty_content() {
        let chunk: ChatChunk =
            serde_json::from_str(r#"{"model":"m","done":true}"#).expect("decode chunk");
        assert_eq!(chunk.content(), "");
        assert!(chunk.done);
    }

    #[test]
    fn chunk_with_unfamiliar_role_still_decodes() {
        let chunk: ChatChunk = serde_json::from_str(
            r#"{"message":{"role":"tool","content":"42"},"done":false}"#,
        )
        .expect("decode chunk");
        assert_eq!(chunk.content(), "42");
        assert_eq!(
            chunk.message.and_then(|message| message.role).as_deref(),
            Some("tool")
        );
    }

    #[test]
    fn running_models_tolerates_extra_fields() {
        let parsed: RunningModels = serde_json::from_str(
            r#"{"models":[{"name":"llama3:8b","size":123,"digest":"abc"}]}"#,
        )
        .expect("decode running models");
        assert_eq!(parsed.models[0].name, "llama3:8b");
    }
}

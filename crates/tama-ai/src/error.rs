use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TamaAiErrorCode {
    Transport,
    Http,
    Protocol,
    Encode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TamaAiError {
    pub code: TamaAiErrorCode,
    pub message: String,
}

impl TamaAiError {
    pub fn new(code: TamaAiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(TamaAiErrorCode::Transport, message)
    }

    pub fn http(status: u16, body: &str) -> Self {
        Self::new(
            TamaAiErrorCode::Http,
            format!("request failed with status {status}: {}", body.trim()),
        )
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(TamaAiErrorCode::Protocol, message)
    }
}

impl Display for TamaAiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TamaAiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_includes_status_and_trimmed_body() {
        let error = TamaAiError::http(404, "model not found\n");
        assert_eq!(error.code, TamaAiErrorCode::Http);
        assert_eq!(
            error.to_string(),
            "request failed with status 404: model not found"
        );
    }

    #[test]
    fn error_code_serializes_as_snake_case() {
        let encoded = serde_json::to_string(&TamaAiErrorCode::Transport).expect("encode code");
        assert_eq!(encoded, "\"transport\"");
    }
}

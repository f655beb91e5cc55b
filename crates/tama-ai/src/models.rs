use tracing::debug;

use crate::client::OllamaClient;
use crate::error::TamaAiError;
use crate::types::RunningModels;

impl OllamaClient {
    /// Names of the models the server currently holds in memory.
    pub async fn running_models(&self) -> Result<Vec<String>, TamaAiError> {
        let response = self
            .http()
            .get(self.running_models_url())
            .send()
            .await
            .map_err(|error| TamaAiError::transport(format!("running models query failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(TamaAiError::http(status, &body));
        }

        let parsed: RunningModels = response.json().await.map_err(|error| {
            TamaAiError::protocol(format!("invalid running models reply: {error}"))
        })?;
        let names: Vec<String> = parsed.models.into_iter().map(|model| model.name).collect();
        debug!(?names, "running models");
        Ok(names)
    }

    pub async fn is_model_loaded(&self, model: &str) -> Result<bool, TamaAiError> {
        Ok(self
            .running_models()
            .await?
            .iter()
            .any(|name| same_model(name, model)))
    }
}

/// Ollama reports untagged models with an explicit `:latest` tag.
fn same_model(running: &str, wanted: &str) -> bool {
    running == wanted
        || (!wanted.contains(':') && running.strip_suffix(":latest") == Some(wanted))
}

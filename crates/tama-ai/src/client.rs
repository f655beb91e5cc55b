use std::sync::OnceLock;

use reqwest::Client;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "gpt-oss:20b";

/// Endpoints of one Ollama server plus the HTTP client used to reach it.
#[derive(Clone, Debug)]
pub struct OllamaClient {
    base_url: String,
    http: Client,
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let http = shared_http_client(&base_url).clone();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn chat_url(&self) -> String {
        join_url(&self.base_url, "api/chat")
    }

    pub fn running_models_url(&self) -> String {
        join_url(&self.base_url, "api/ps")
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    if base_url.ends_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}

fn shared_http_client(base_url: &str) -> &'static Client {
    static DEFAULT_CLIENT: OnceLock<Client> = OnceLock::new();
    static LOOPBACK_CLIENT: OnceLock<Client> = OnceLock::new();

    // A local Ollama must never be routed through HTTP(S)_PROXY.
    if is_loopback_base_url(base_url) {
        LOOPBACK_CLIENT.get_or_init(|| {
            Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new())
        })
    } else {
        DEFAULT_CLIENT.get_or_init(Client::new)
    }
}

pub(crate) fn is_loopback_base_url(base_url: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(base_url) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1" || host == "[::1]"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_join_with_or_without_trailing_slash() {
        let plain = OllamaClient::new("http://localhost:11434");
        let slashed = OllamaClient::new("http://localhost:11434/");
        assert_eq!(plain.chat_url(), "http://localhost:11434/api/chat");
        assert_eq!(slashed.chat_url(), "http://localhost:11434/api/chat");
        assert_eq!(plain.running_models_url(), "http://localhost:11434/api/ps");
    }

    #[test]
    fn loopback_detection() {
        assert!(is_loopback_base_url("http://localhost:11434"));
        assert!(is_loopback_base_url("http://127.0.0.1:11434"));
        assert!(is_loopback_base_url("http://[::1]:11434"));
        assert!(!is_loopback_base_url("http://ollama.internal:11434"));
        assert!(!is_loopback_base_url("not a url"));
    }
}

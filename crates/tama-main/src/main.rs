use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tama_ai::OllamaClient;
use tama_core::{LastModelStore, Session};
use tama_tui::{TuiOptions, run_tui};
use tracing::info;

mod config;
mod logging;
mod model_store;
mod paths;

use config::CliOverrides;
use model_store::XdgModelStore;

#[derive(Parser, Debug)]
#[command(name = "tama", version, about = "Terminal chat client for a local Ollama server")]
struct Cli {
    /// Directory holding tama.toml.
    #[arg(long)]
    conf_dir: Option<PathBuf>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    base_url: Option<String>,
    /// dark or light
    #[arg(long)]
    theme: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            theme: self.theme.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let conf_dir = paths::resolve_conf_dir(cli.conf_dir.as_deref());
    let file = config::load_config_file(&conf_dir)?;
    let model_store = Arc::new(XdgModelStore::at_default_location());
    let resolved = config::resolve(file, &cli.overrides(), model_store.load())?;

    logging::init_tracing(&resolved.log_level, &resolved.log_dir);
    info!(
        conf_dir = %conf_dir.display(),
        base_url = %resolved.base_url,
        model = %resolved.model,
        last_model_path = %model_store.path().display(),
        "starting tama"
    );

    let client = OllamaClient::new(resolved.base_url.clone());
    let session = Session::new(resolved.model.clone());
    let options = TuiOptions {
        version: env!("CARGO_PKG_VERSION").to_string(),
        theme: resolved.theme,
        content_width: resolved.content_width,
        poll_interval: resolved.poll_interval,
        ..TuiOptions::default()
    };
    let result = run_tui(client, session, model_store, options).await;
    info!(ok = result.is_ok(), "tama exited");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_accepts_no_arguments() {
        let parsed = Cli::try_parse_from(["tama"]).expect("bare invocation should parse");
        assert!(parsed.conf_dir.is_none());
        assert!(parsed.model.is_none());
    }

    #[test]
    fn cli_flags_become_overrides() {
        let parsed = Cli::try_parse_from([
            "tama",
            "--conf-dir",
            "/tmp/tama",
            "--model",
            "llama3",
            "--base-url",
            "http://gpu-box:11434",
            "--theme",
            "light",
        ])
        .expect("flags should parse");
        assert_eq!(parsed.conf_dir, Some(PathBuf::from("/tmp/tama")));

        let overrides = parsed.overrides();
        assert_eq!(overrides.model.as_deref(), Some("llama3"));
        assert_eq!(overrides.base_url.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(overrides.theme.as_deref(), Some("light"));
    }

    #[test]
    fn cli_rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["tama", "--no-tui"]).is_err());
    }
}

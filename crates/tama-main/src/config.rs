use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tama_ai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use tama_tui::options::{DEFAULT_CONTENT_WIDTH, DEFAULT_POLL_INTERVAL};
use tama_tui::TuiTheme;

use crate::paths;

pub const CONFIG_FILE_NAME: &str = "tama.toml";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TamaToml {
    #[serde(default)]
    ollama: TamaTomlOllama,
    #[serde(default)]
    tui: TamaTomlTui,
    #[serde(default)]
    log: TamaTomlLog,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TamaTomlOllama {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TamaTomlTui {
    #[serde(default)]
    content_width: Option<u16>,
    #[serde(default)]
    theme: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TamaTomlLog {
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

/// Values given on the command line; each one beats the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub theme: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub model: String,
    pub poll_interval: Duration,
    pub content_width: u16,
    pub theme: TuiTheme,
    pub log_level: String,
    pub log_dir: PathBuf,
}

/// A missing file is the same as an empty one.
pub fn load_config_file(conf_dir: &Path) -> Result<TamaToml, String> {
    let path = conf_dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(TamaToml::default());
    }
    let content = std::fs::read_to_string(&path)
        .map_err(|error| format!("read {} failed: {error}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<TamaToml, String> {
    if content.trim().is_empty() {
        return Ok(TamaToml::default());
    }
    toml::from_str::<TamaToml>(content)
        .map_err(|error| format!("parse {CONFIG_FILE_NAME} failed: {error}"))
}

/// Model precedence: CLI flag, then the persisted last model, then the
/// config file, then the built-in default.
pub fn resolve(
    file: TamaToml,
    overrides: &CliOverrides,
    last_model: Option<String>,
) -> Result<ResolvedConfig, String> {
    let TamaToml { ollama, tui, log } = file;

    let model = first_non_empty([overrides.model.clone(), last_model, ollama.model])
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let base_url = first_non_empty([overrides.base_url.clone(), ollama.base_url])
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let theme = match first_non_empty([overrides.theme.clone(), tui.theme]) {
        Some(name) => TuiTheme::from_name(&name)
            .ok_or_else(|| format!("unknown theme '{name}', expected dark or light"))?,
        None => TuiTheme::default(),
    };

    let poll_interval = match ollama.poll_interval_ms {
        Some(0) => return Err("ollama.poll_interval_ms must be greater than zero".to_string()),
        Some(millis) => Duration::from_millis(millis),
        None => DEFAULT_POLL_INTERVAL,
    };
    let content_width = match tui.content_width {
        Some(0) => return Err("tui.content_width must be greater than zero".to_string()),
        Some(width) => width,
        None => DEFAULT_CONTENT_WIDTH,
    };

    let log_level = first_non_empty([log.level]).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let log_dir = first_non_empty([log.path])
        .map(|path| paths::resolve_path_arg(Path::new(&path)))
        .unwrap_or_else(paths::default_state_dir);

    Ok(ResolvedConfig {
        base_url,
        model,
        poll_interval,
        content_width,
        theme,
        log_level,
        log_dir,
    })
}

fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

use std::time::Duration;

use crate::{TuiKeyBindings, TuiTheme};

pub const DEFAULT_CONTENT_WIDTH: u16 = 100;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
pub struct TuiOptions {
    pub app_name: String,
    pub version: String,
    pub keybindings: TuiKeyBindings,
    pub theme: TuiTheme,
    /// Turn text wraps at this many columns even on wider terminals.
    pub content_width: u16,
    /// Cadence of the status timer and of model-status queries while loading.
    pub poll_interval: Duration,
}

impl Default for TuiOptions {
    fn default() -> Self {
        Self {
            app_name: "tama".to_string(),
            version: String::new(),
            keybindings: TuiKeyBindings::default(),
            theme: TuiTheme::default(),
            content_width: DEFAULT_CONTENT_WIDTH,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TuiOptions;

    #[test]
    fn defaults_match_the_documented_config() {
        let options = TuiOptions::default();
        assert_eq!(options.app_name, "tama");
        assert_eq!(options.content_width, 100);
        assert_eq!(options.poll_interval.as_millis(), 100);
    }
}

use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use tama_core::StatusLevel;

const DARK_THEME_JSON: &str = include_str!("../themes/dark.json");
const LIGHT_THEME_JSON: &str = include_str!("../themes/light.json");
const DEFAULT_INPUT_PROMPT: &str = "> ";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TuiTheme {
    #[default]
    Dark,
    Light,
}

impl TuiTheme {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    fn palette(self) -> &'static ThemePalette {
        static DARK: OnceLock<ThemePalette> = OnceLock::new();
        static LIGHT: OnceLock<ThemePalette> = OnceLock::new();

        let (cell, raw) = match self {
            Self::Dark => (&DARK, DARK_THEME_JSON),
            Self::Light => (&LIGHT, LIGHT_THEME_JSON),
        };
        cell.get_or_init(|| {
            ThemePalette::from_json(self.name(), raw).unwrap_or_else(|error| {
                tracing::warn!(theme = self.name(), %error, "built-in theme rejected, using terminal colors");
                ThemePalette::terminal_default()
            })
        })
    }

    pub(crate) fn transcript_style(self) -> Style {
        let colors = &self.palette().colors;
        Style::default().fg(colors.transcript_fg).bg(colors.transcript_bg)
    }

    pub(crate) fn header_style(self) -> Style {
        Style::default()
            .fg(self.palette().colors.header_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn request_header_style(self) -> Style {
        Style::default()
            .fg(self.palette().colors.request_header_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn response_header_style(self) -> Style {
        Style::default()
            .fg(self.palette().colors.response_header_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn muted_style(self) -> Style {
        Style::default().fg(self.palette().colors.muted_fg)
    }

    pub(crate) fn code_style(self) -> Style {
        let colors = &self.palette().colors;
        Style::default().fg(colors.code_fg).bg(colors.code_bg)
    }

    pub(crate) fn input_style(self) -> Style {
        let colors = &self.palette().colors;
        Style::default().fg(colors.transcript_fg).bg(colors.input_block_bg)
    }

    pub(crate) fn input_border_style(self) -> Style {
        Style::default().fg(self.palette().colors.input_border)
    }

    pub(crate) fn input_prompt(self) -> &'static str {
        self.palette().input_prompt.as_str()
    }

    pub(crate) fn footer_style(self) -> Style {
        let colors = &self.palette().colors;
        Style::default().fg(colors.footer_fg).bg(colors.footer_bg)
    }

    pub(crate) fn activity_style(self) -> Style {
        Style::default().fg(self.palette().colors.activity_fg)
    }

    pub(crate) fn status_style(self, level: StatusLevel) -> Style {
        let colors = &self.palette().colors;
        let fg = match level {
            StatusLevel::Info => colors.info_fg,
            StatusLevel::Warning => colors.warning_fg,
            StatusLevel::Error => colors.error_fg,
        };
        Style::default().fg(fg)
    }
}

#[derive(Clone, Copy, Debug)]
struct ThemeColors {
    transcript_fg: Color,
    transcript_bg: Color,
    header_fg: Color,
    request_header_fg: Color,
    response_header_fg: Color,
    muted_fg: Color,
    code_fg: Color,
    code_bg: Color,
    input_border: Color,
    input_block_bg: Color,
    footer_fg: Color,
    footer_bg: Color,
    activity_fg: Color,
    info_fg: Color,
    warning_fg: Color,
    error_fg: Color,
}

#[derive(Clone, Debug)]
struct ThemePalette {
    colors: ThemeColors,
    input_prompt: String,
}

impl ThemePalette {
    fn terminal_default() -> Self {
        Self {
            colors: ThemeColors {
                transcript_fg: Color::Reset,
                transcript_bg: Color::Reset,
                header_fg: Color::Cyan,
                request_header_fg: Color::Magenta,
                response_header_fg: Color::Green,
                muted_fg: Color::DarkGray,
                code_fg: Color::Yellow,
                code_bg: Color::Reset,
                input_border: Color::DarkGray,
                input_block_bg: Color::Reset,
                footer_fg: Color::Gray,
                footer_bg: Color::Reset,
                activity_fg: Color::Yellow,
                info_fg: Color::Cyan,
                warning_fg: Color::Yellow,
                error_fg: Color::Red,
            },
            input_prompt: DEFAULT_INPUT_PROMPT.to_string(),
        }
    }

    fn from_json(expected_name: &str, raw_json: &str) -> Result<Self, String> {
        let parsed: ThemeFile = serde_json::from_str(raw_json)
            .map_err(|error| format!("invalid theme json: {error}"))?;
        let ThemeFile {
            name,
            colors,
            input_prompt,
        } = parsed;

        if name.trim().to_ascii_lowercase() != expected_name {
            return Err(format!(
                "theme name mismatch, expected '{expected_name}' got '{name}'"
            ));
        }

        let field = |label: &str, value: &str| {
            parse_color(value).map_err(|error| format!("invalid {label}: {error}"))
        };
        let transcript_fg = field("transcriptFg", &colors.transcript_fg)?;
        let header_fg = colors
            .header_fg
            .as_deref()
            .map(|value| field("headerFg", value))
            .transpose()?
            .unwrap_or(transcript_fg);
        let muted_fg = field("mutedFg", &colors.muted_fg)?;
        let warning_fg = field("warningFg", &colors.warning_fg)?;
        let input_block_bg = field("inputBlockBg", &colors.input_block_bg)?;

        Ok(Self {
            colors: ThemeColors {
                transcript_fg,
                transcript_bg: field("transcriptBg", &colors.transcript_bg)?,
                header_fg,
                request_header_fg: field("requestHeaderFg", &colors.request_header_fg)?,
                response_header_fg: field("responseHeaderFg", &colors.response_header_fg)?,
                muted_fg,
                code_fg: colors
                    .code_fg
                    .as_deref()
                    .map(|value| field("codeFg", value))
                    .transpose()?
                    .unwrap_or(warning_fg),
                code_bg: colors
                    .code_bg
                    .as_deref()
                    .map(|value| field("codeBg", value))
                    .transpose()?
                    .unwrap_or(input_block_bg),
                input_border: field("inputBorder", &colors.input_border)?,
                input_block_bg,
                footer_fg: field("footerFg", &colors.footer_fg)?,
                footer_bg: field("footerBg", &colors.footer_bg)?,
                activity_fg: colors
                    .activity_fg
                    .as_deref()
                    .map(|value| field("activityFg", value))
                    .transpose()?
                    .unwrap_or(warning_fg),
                info_fg: colors
                    .info_fg
                    .as_deref()
                    .map(|value| field("infoFg", value))
                    .transpose()?
                    .unwrap_or(muted_fg),
                warning_fg,
                error_fg: field("errorFg", &colors.error_fg)?,
            },
            input_prompt,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ThemeFile {
    name: String,
    #[serde(
        default = "default_input_prompt",
        rename = "inputPrompt",
        alias = "input_prompt"
    )]
    input_prompt: String,
    colors: ThemeFileColors,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeFileColors {
    transcript_fg: String,
    transcript_bg: String,
    header_fg: Option<String>,
    request_header_fg: String,
    response_header_fg: String,
    muted_fg: String,
    code_fg: Option<String>,
    code_bg: Option<String>,
    input_border: String,
    input_block_bg: String,
    footer_fg: String,
    footer_bg: String,
    activity_fg: Option<String>,
    info_fg: Option<String>,
    warning_fg: String,
    error_fg: String,
}

fn default_input_prompt() -> String {
    DEFAULT_INPUT_PROMPT.to_string()
}

fn parse_color(raw: &str) -> Result<Color, String> {
    let normalized = raw.trim();
    if normalized.is_empty() {
        return Err("empty color value".to_string());
    }

    if let Some(hex) = normalized.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    match normalized.to_ascii_lowercase().as_str() {
        "reset" | "default" => Ok(Color::Reset),
        "black" => Ok(Color::Black),
        "white" => Ok(Color::White),
        "green" => Ok(Color::Green),
        "darkgray" | "dark_gray" => Ok(Color::DarkGray),
        "gray" => Ok(Color::Gray),
        "red" => Ok(Color::Red),
        "yellow" => Ok(Color::Yellow),
        "cyan" => Ok(Color::Cyan),
        "magenta" => Ok(Color::Magenta),
        "blue" => Ok(Color::Blue),
        other => Err(format!("unsupported named color '{other}'")),
    }
}

fn parse_hex_color(hex: &str) -> Result<Color, String> {
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected 6 hex digits, got '{hex}'"));
    }

    let red = u8::from_str_radix(&hex[0..2], 16)
        .map_err(|error| format!("invalid red channel '{}': {error}", &hex[0..2]))?;
    let green = u8::from_str_radix(&hex[2..4], 16)
        .map_err(|error| format!("invalid green channel '{}': {error}", &hex[2..4]))?;
    let blue = u8::from_str_radix(&hex[4..6], 16)
        .map_err(|error| format!("invalid blue channel '{}': {error}", &hex[4..6]))?;
    Ok(Color::Rgb(red, green, blue))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_color_supports_named_and_hex_values() {
        assert_eq!(parse_color("gray"), Ok(Color::Gray));
        assert_eq!(parse_color("#547da7"), Ok(Color::Rgb(84, 125, 167)));
        assert!(parse_color("#54").is_err());
        assert!(parse_color("chartreuse").is_err());
    }

    #[test]
    fn built_in_themes_parse() {
        for theme in [TuiTheme::Dark, TuiTheme::Light] {
            let raw = match theme {
                TuiTheme::Dark => DARK_THEME_JSON,
                TuiTheme::Light => LIGHT_THEME_JSON,
            };
            let palette = ThemePalette::from_json(theme.name(), raw)
                .unwrap_or_else(|error| panic!("{} theme: {error}", theme.name()));
            assert_eq!(palette.input_prompt, "> ");
        }
    }

    #[test]
    fn code_colors_fall_back_when_absent() {
        let raw = r##"{
            "name": "dark",
            "colors": {
                "transcriptFg": "#c0caf5",
                "transcriptBg": "#1a1b26",
                "requestHeaderFg": "#bb9af7",
                "responseHeaderFg": "#9ece6a",
                "mutedFg": "#565f89",
                "inputBorder": "#3b4261",
                "inputBlockBg": "#1f2335",
                "footerFg": "#a9b1d6",
                "footerBg": "#16161e",
                "warningFg": "#e0af68",
                "errorFg": "#f7768e"
            }
        }"##;
        let palette = ThemePalette::from_json("dark", raw).expect("theme without code colors");
        assert_eq!(palette.colors.code_fg, Color::Rgb(0xe0, 0xaf, 0x68));
        assert_eq!(palette.colors.code_bg, Color::Rgb(0x1f, 0x23, 0x35));
    }

    #[test]
    fn theme_name_must_match() {
        let error = ThemePalette::from_json("light", DARK_THEME_JSON).unwrap_err();
        assert!(error.contains("theme name mismatch"));
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(TuiTheme::from_name(" Light "), Some(TuiTheme::Light));
        assert_eq!(TuiTheme::from_name("solarized"), None);
    }

    #[test]
    fn status_levels_get_distinct_colors() {
        let theme = TuiTheme::Dark;
        assert_ne!(
            theme.status_style(StatusLevel::Error),
            theme.status_style(StatusLevel::Warning)
        );
    }
}

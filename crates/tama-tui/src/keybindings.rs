use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn ctrl(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch),
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub(crate) fn matches(self, key: KeyEvent) -> bool {
        if key.code != self.code {
            return false;
        }

        let mut expected = normalize_modifiers(self.modifiers);
        let mut actual = normalize_modifiers(key.modifiers);
        // Shifted characters arrive with or without SHIFT depending on the terminal.
        if is_shifted_char(self.code) {
            expected.remove(KeyModifiers::SHIFT);
            actual.remove(KeyModifiers::SHIFT);
        }
        actual == expected
    }
}

fn normalize_modifiers(modifiers: KeyModifiers) -> KeyModifiers {
    let mut normalized = KeyModifiers::NONE;

    if modifiers.contains(KeyModifiers::SHIFT) {
        normalized |= KeyModifiers::SHIFT;
    }
    if modifiers.contains(KeyModifiers::CONTROL) {
        normalized |= KeyModifiers::CONTROL;
    }
    if modifiers.intersects(KeyModifiers::ALT | KeyModifiers::META) {
        normalized |= KeyModifiers::ALT;
    }
    if modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::HYPER) {
        normalized |= KeyModifiers::SUPER;
    }

    normalized
}

fn is_shifted_char(code: KeyCode) -> bool {
    match code {
        KeyCode::Char(ch) => ch.is_ascii_uppercase() || (ch.is_ascii_punctuation() && ch != '/'),
        _ => false,
    }
}

/// Parses ids like `ctrl+c`, `shift+enter`, `pageup` or a single character.
/// A lone uppercase letter keeps its case, so `G` and `g` are distinct keys.
pub fn parse_key_id(key_id: &str) -> Option<KeyBinding> {
    let trimmed = key_id.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut modifiers = KeyModifiers::NONE;
    let mut key_name = None;
    for segment in trimmed.split('+').filter(|part| !part.is_empty()) {
        match segment.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" => modifiers |= KeyModifiers::ALT,
            "meta" | "cmd" | "super" => modifiers |= KeyModifiers::SUPER,
            _ => key_name = Some(segment),
        }
    }

    let name = key_name?;
    if name.chars().count() == 1 {
        let ch = name.chars().next()?;
        let ch = if modifiers.contains(KeyModifiers::CONTROL) {
            ch.to_ascii_lowercase()
        } else {
            ch
        };
        return Some(KeyBinding {
            code: KeyCode::Char(ch),
            modifiers,
        });
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "enter" => KeyCode::Enter,
        "escape" | "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        lower if lower.starts_with('f') => {
            let number = lower[1..].parse::<u8>().ok()?;
            KeyCode::F(number)
        }
        _ => return None,
    };

    Some(KeyBinding { code, modifiers })
}

pub(crate) fn matches_keybinding(bindings: &[KeyBinding], key: KeyEvent) -> bool {
    bindings.iter().copied().any(|binding| binding.matches(key))
}

pub(crate) fn keybinding_label(bindings: &[KeyBinding]) -> String {
    if bindings.is_empty() {
        return "(unbound)".to_string();
    }
    bindings
        .iter()
        .copied()
        .map(format_keybinding)
        .collect::<Vec<_>>()
        .join("/")
}

fn format_keybinding(binding: KeyBinding) -> String {
    let mut parts = Vec::new();
    if binding.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("ctrl".to_string());
    }
    if binding.modifiers.contains(KeyModifiers::SHIFT) {
        parts.push("shift".to_string());
    }
    if binding.modifiers.contains(KeyModifiers::ALT) {
        parts.push("alt".to_string());
    }
    if binding.modifiers.contains(KeyModifiers::SUPER) {
        parts.push("meta".to_string());
    }
    parts.push(match binding.code {
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pgup".to_string(),
        KeyCode::PageDown => "pgdn".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::F(number) => format!("f{number}"),
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(ch) => ch.to_string(),
        _ => "key".to_string(),
    });
    parts.join("+")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TuiKeyBindings {
    pub submit: Vec<KeyBinding>,
    pub newline: Vec<KeyBinding>,
    pub enter_compose: Vec<KeyBinding>,
    pub exit_compose: Vec<KeyBinding>,
    pub interrupt: Vec<KeyBinding>,
    pub terminate: Vec<KeyBinding>,
    pub next_turn: Vec<KeyBinding>,
    pub previous_turn: Vec<KeyBinding>,
    /// Pressed twice in a row.
    pub scroll_top: Vec<KeyBinding>,
    pub scroll_bottom: Vec<KeyBinding>,
    pub scroll_down: Vec<KeyBinding>,
    pub scroll_up: Vec<KeyBinding>,
    pub page_down: Vec<KeyBinding>,
    pub page_up: Vec<KeyBinding>,
}

impl Default for TuiKeyBindings {
    fn default() -> Self {
        Self {
            submit: vec![KeyBinding::plain(KeyCode::Enter)],
            newline: vec![
                KeyBinding {
                    code: KeyCode::Enter,
                    modifiers: KeyModifiers::SHIFT,
                },
                KeyBinding::ctrl('j'),
            ],
            enter_compose: vec![KeyBinding::plain(KeyCode::Char('i'))],
            exit_compose: vec![KeyBinding::plain(KeyCode::Esc)],
            interrupt: vec![KeyBinding::ctrl('c')],
            terminate: vec![KeyBinding::ctrl('d')],
            next_turn: vec![KeyBinding::plain(KeyCode::Char('J'))],
            previous_turn: vec![KeyBinding::plain(KeyCode::Char('K'))],
            scroll_top: vec![KeyBinding::plain(KeyCode::Char('g'))],
            scroll_bottom: vec![KeyBinding::plain(KeyCode::Char('G'))],
            scroll_down: vec![
                KeyBinding::plain(KeyCode::Char('j')),
                KeyBinding::plain(KeyCode::Down),
            ],
            scroll_up: vec![
                KeyBinding::plain(KeyCode::Char('k')),
                KeyBinding::plain(KeyCode::Up),
            ],
            page_down: vec![
                KeyBinding::plain(KeyCode::PageDown),
                KeyBinding::ctrl('f'),
            ],
            page_up: vec![KeyBinding::plain(KeyCode::PageUp), KeyBinding::ctrl('b')],
        }
    }
}

use std::io;

use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

/// Undoes whatever `enter` switched on, in reverse order, when dropped.
pub(crate) struct TerminalRestore {
    pub(crate) keyboard_enhancement_enabled: bool,
    pub(crate) bracketed_paste_enabled: bool,
    pub(crate) alternate_screen_enabled: bool,
}

impl TerminalRestore {
    pub(crate) fn enter() -> Result<Self, String> {
        enable_raw_mode().map_err(|error| format!("enable raw mode failed: {error}"))?;
        let mut restore = Self {
            keyboard_enhancement_enabled: false,
            bracketed_paste_enabled: false,
            alternate_screen_enabled: false,
        };

        execute!(io::stdout(), EnterAlternateScreen)
            .map_err(|error| format!("enter alternate screen failed: {error}"))?;
        restore.alternate_screen_enabled = true;

        restore.keyboard_enhancement_enabled =
            if crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false) {
                execute!(
                    io::stdout(),
                    PushKeyboardEnhancementFlags(
                        KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    )
                )
                .is_ok()
            } else {
                false
            };
        restore.bracketed_paste_enabled = execute!(io::stdout(), EnableBracketedPaste).is_ok();
        Ok(restore)
    }
}

impl Drop for TerminalRestore {
    fn drop(&mut self) {
        if self.keyboard_enhancement_enabled {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        if self.bracketed_paste_enabled {
            let _ = execute!(io::stdout(), DisableBracketedPaste);
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
        let _ = disable_raw_mode();
    }
}

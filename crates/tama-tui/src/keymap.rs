use crossterm::event::KeyEvent;
use tama_core::{Command, Mode};

use crate::editor::ComposeEditor;
use crate::keybindings::{KeyBinding, TuiKeyBindings, matches_keybinding};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum KeyOutcome {
    Command(Command),
    /// Local change only (editor text, a pending key sequence).
    Redraw,
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ComposeAction {
    Submit,
    Newline,
    Command(Command),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ReviewAction {
    ScrollTopPrefix,
    Command(Command),
}

type Table<A> = Vec<(Vec<KeyBinding>, A)>;

/// Per-mode dispatch tables. Compose sends unmatched keys to the editor;
/// Review drops them.
pub(crate) struct KeyMap {
    compose: Table<ComposeAction>,
    review: Table<ReviewAction>,
    pending_prefix: bool,
}

impl KeyMap {
    pub(crate) fn new(bindings: &TuiKeyBindings) -> Self {
        let compose = vec![
            (bindings.interrupt.clone(), ComposeAction::Command(Command::Interrupt)),
            (bindings.terminate.clone(), ComposeAction::Command(Command::Terminate)),
            (bindings.exit_compose.clone(), ComposeAction::Command(Command::ExitCompose)),
            (bindings.newline.clone(), ComposeAction::Newline),
            (bindings.submit.clone(), ComposeAction::Submit),
        ];
        let review = vec![
            (bindings.interrupt.clone(), ReviewAction::Command(Command::Interrupt)),
            (bindings.terminate.clone(), ReviewAction::Command(Command::Terminate)),
            (bindings.enter_compose.clone(), ReviewAction::Command(Command::EnterCompose)),
            (bindings.next_turn.clone(), ReviewAction::Command(Command::NavigateNext)),
            (bindings.previous_turn.clone(), ReviewAction::Command(Command::NavigatePrevious)),
            (bindings.scroll_top.clone(), ReviewAction::ScrollTopPrefix),
            (bindings.scroll_bottom.clone(), ReviewAction::Command(Command::ScrollBottom)),
            (bindings.scroll_down.clone(), ReviewAction::Command(Command::ScrollBy(1))),
            (bindings.scroll_up.clone(), ReviewAction::Command(Command::ScrollBy(-1))),
            (bindings.page_down.clone(), ReviewAction::Command(Command::ScrollPage(1))),
            (bindings.page_up.clone(), ReviewAction::Command(Command::ScrollPage(-1))),
        ];
        Self {
            compose,
            review,
            pending_prefix: false,
        }
    }

    pub(crate) fn has_pending_prefix(&self) -> bool {
        self.pending_prefix
    }

    pub(crate) fn dispatch(
        &mut self,
        mode: Mode,
        key: KeyEvent,
        editor: &mut ComposeEditor,
    ) -> KeyOutcome {
        match mode {
            Mode::Compose => {
                self.pending_prefix = false;
                self.dispatch_compose(key, editor)
            }
            Mode::Review => self.dispatch_review(key),
        }
    }

    fn dispatch_compose(&self, key: KeyEvent, editor: &mut ComposeEditor) -> KeyOutcome {
        let action = self
            .compose
            .iter()
            .find(|(bindings, _)| matches_keybinding(bindings, key))
            .map(|(_, action)| action.clone());
        match action {
            Some(ComposeAction::Command(command)) => KeyOutcome::Command(command),
            Some(ComposeAction::Newline) => {
                editor.insert_char('\n');
                KeyOutcome::Redraw
            }
            Some(ComposeAction::Submit) => {
                if editor.text().trim().is_empty() {
                    return KeyOutcome::Ignored;
                }
                KeyOutcome::Command(Command::SubmitText(editor.take()))
            }
            None => {
                if editor.handle_key(key) {
                    KeyOutcome::Redraw
                } else {
                    KeyOutcome::Ignored
                }
            }
        }
    }

    fn dispatch_review(&mut self, key: KeyEvent) -> KeyOutcome {
        let action = self
            .review
            .iter()
            .find(|(bindings, _)| matches_keybinding(bindings, key))
            .map(|(_, action)| action.clone());
        let had_prefix = std::mem::take(&mut self.pending_prefix);
        match action {
            Some(ReviewAction::ScrollTopPrefix) if had_prefix => {
                KeyOutcome::Command(Command::ScrollTop)
            }
            Some(ReviewAction::ScrollTopPrefix) => {
                self.pending_prefix = true;
                KeyOutcome::Redraw
            }
            Some(ReviewAction::Command(command)) => KeyOutcome::Command(command),
            None if had_prefix => KeyOutcome::Redraw,
            None => KeyOutcome::Ignored,
        }
    }
}

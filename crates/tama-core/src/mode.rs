use crate::error::SessionError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Keys go to the prompt editor.
    #[default]
    Compose,
    /// Keys navigate between and within turns.
    Review,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeMachine {
    mode: Mode,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn exit_compose(&mut self) -> bool {
        let changed = self.mode == Mode::Compose;
        self.mode = Mode::Review;
        changed
    }

    /// Rejected while a dispatch is in flight; the user watches the reply
    /// stream in instead of typing ahead.
    pub fn enter_compose(&mut self, dispatch_active: bool) -> Result<bool, SessionError> {
        if dispatch_active {
            return Err(SessionError::DispatchActive);
        }
        let changed = self.mode == Mode::Review;
        self.mode = Mode::Compose;
        Ok(changed)
    }

    pub fn on_submit(&mut self) {
        self.mode = Mode::Review;
    }

    pub fn on_dispatch_settled(&mut self) {
        self.mode = Mode::Review;
    }
}

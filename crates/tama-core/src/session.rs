use std::fmt;
use std::time::Instant;

use tama_ai::{AbortSignal, ChatRequest, DispatchEvent, StreamEnd};
use tracing::{debug, info, warn};

use crate::availability::{Activity, ModelAvailability};
use crate::cancel::CancellationController;
use crate::command::{Command, InputAction, parse_input};
use crate::error::SessionError;
use crate::mode::{Mode, ModeMachine};
use crate::navigator::Navigator;
use crate::store::TurnStore;

/// Monotonic id handed to each dispatch so late events from an abandoned one
/// can be told apart from the live one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DispatchId(u64);

impl DispatchId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the background task needs, captured by value at submission.
#[derive(Clone, Debug)]
pub struct DispatchRequest {
    pub id: DispatchId,
    pub target: usize,
    pub request: ChatRequest,
    pub signal: AbortSignal,
}

/// Side effects the event loop must carry out after a transition.
#[derive(Clone, Debug)]
pub enum Effect {
    Dispatch(DispatchRequest),
    PersistModel(String),
    PollModelStatus(String),
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ActiveDispatch {
    id: DispatchId,
    target: usize,
}

/// The whole interactive state, owned by exactly one event loop.
///
/// Transitions take a command or an event and return the effects to run;
/// nothing in here performs I/O.
pub struct Session {
    store: TurnStore,
    mode: ModeMachine,
    navigator: Navigator,
    cancellation: CancellationController,
    availability: ModelAvailability,
    active: Option<ActiveDispatch>,
    next_dispatch_id: u64,
    status: Option<StatusMessage>,
}

impl Session {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            store: TurnStore::new(),
            mode: ModeMachine::new(),
            navigator: Navigator::new(),
            cancellation: CancellationController::new(),
            availability: ModelAvailability::new(model),
            active: None,
            next_dispatch_id: 1,
            status: None,
        }
    }

    pub fn model(&self) -> &str {
        self.availability.name()
    }

    pub fn store(&self) -> &TurnStore {
        &self.store
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn availability(&self) -> &ModelAvailability {
        &self.availability
    }

    pub fn activity(&self, now: Instant) -> Option<Activity> {
        self.availability.activity(now)
    }

    pub fn is_dispatch_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }

    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    /// Applies one user command. Rejections leave the state untouched.
    pub fn handle(&mut self, command: Command, now: Instant) -> Result<Vec<Effect>, SessionError> {
        match command {
            Command::SubmitText(text) => {
                self.require_compose()?;
                match parse_input(&text) {
                    InputAction::Reset => {
                        self.reset();
                        Ok(Vec::new())
                    }
                    InputAction::Quit => Ok(vec![Effect::Exit]),
                    InputAction::Prompt(prompt) => self.submit(&prompt, now),
                }
            }
            Command::EnterCompose => {
                self.mode.enter_compose(self.active.is_some())?;
                Ok(Vec::new())
            }
            Command::ExitCompose => {
                self.mode.exit_compose();
                Ok(Vec::new())
            }
            Command::Interrupt => Ok(self.interrupt()),
            Command::NavigateNext => {
                self.require_review()?;
                self.navigator.next(&mut self.store);
                Ok(Vec::new())
            }
            Command::NavigatePrevious => {
                self.require_review()?;
                self.navigator.previous(&mut self.store);
                Ok(Vec::new())
            }
            Command::ScrollTop => {
                self.require_review()?;
                self.navigator.scroll_to_top();
                Ok(Vec::new())
            }
            Command::ScrollBottom => {
                self.require_review()?;
                self.navigator.scroll_to_bottom();
                Ok(Vec::new())
            }
            Command::ScrollBy(lines) => {
                self.require_review()?;
                self.navigator.scroll_by(lines);
                Ok(Vec::new())
            }
            Command::ScrollPage(pages) => {
                self.require_review()?;
                let lines = pages.saturating_mul(self.navigator.page_lines());
                self.navigator.scroll_by(lines);
                Ok(Vec::new())
            }
            Command::ResetSession => {
                self.reset();
                Ok(Vec::new())
            }
            Command::Terminate => Ok(vec![Effect::Exit]),
        }
    }

    /// Review is forced for the whole of a dispatch, so a submission from
    /// Review while one is live reports the dispatch.
    fn require_compose(&self) -> Result<(), SessionError> {
        match self.mode.mode() {
            Mode::Compose => Ok(()),
            Mode::Review if self.active.is_some() => Err(SessionError::DispatchActive),
            Mode::Review => Err(SessionError::NotInComposeMode),
        }
    }

    fn require_review(&self) -> Result<(), SessionError> {
        if self.mode.mode() == Mode::Review {
            Ok(())
        } else {
            Err(SessionError::NotInReviewMode)
        }
    }

    fn submit(&mut self, prompt: &str, now: Instant) -> Result<Vec<Effect>, SessionError> {
        if prompt.trim().is_empty() {
            return Err(SessionError::InvalidInput);
        }
        if self.active.is_some() {
            return Err(SessionError::DispatchActive);
        }

        let target = self.store.submit(prompt)?;
        self.mode.on_submit();
        self.navigator.scroll_to_top();
        self.availability.begin_loading(now);
        self.status = None;

        let id = DispatchId(self.next_dispatch_id);
        self.next_dispatch_id += 1;
        let signal = self.cancellation.begin_dispatch();
        self.active = Some(ActiveDispatch { id, target });

        let model = self.availability.name().to_string();
        let request = ChatRequest::streaming(model.clone(), self.store.build_history());
        info!(
            dispatch = %id,
            target,
            messages = request.messages.len(),
            "submitting turn"
        );

        Ok(vec![
            Effect::PersistModel(model.clone()),
            Effect::PollModelStatus(model),
            Effect::Dispatch(DispatchRequest {
                id,
                target,
                request,
                signal,
            }),
        ])
    }

    fn interrupt(&mut self) -> Vec<Effect> {
        let Some(active) = self.active.take() else {
            return vec![Effect::Exit];
        };
        self.cancellation.cancel();
        self.store.cancel(active.target);
        self.store.clear_accumulator();
        self.availability.stop();
        self.mode.on_dispatch_settled();
        self.status = Some(StatusMessage::info("request cancelled"));
        info!(dispatch = %active.id, target = active.target, "dispatch cancelled");
        Vec::new()
    }

    fn reset(&mut self) {
        if let Some(active) = self.active.take() {
            self.cancellation.cancel();
            info!(dispatch = %active.id, "dispatch abandoned by reset");
        }
        self.store.reset();
        self.navigator.reset();
        self.availability.stop();
        self.status = None;
    }

    fn is_live(&self, id: DispatchId, target: usize) -> bool {
        match self.active {
            Some(active) if active.id == id && active.target == target => self
                .store
                .get(target)
                .is_some_and(|turn| turn.is_pending()),
            _ => false,
        }
    }

    /// Applies one event from a background dispatch. Events that do not
    /// belong to the live dispatch are dropped.
    pub fn on_dispatch_event(
        &mut self,
        id: DispatchId,
        target: usize,
        event: DispatchEvent,
        now: Instant,
    ) -> bool {
        if !self.is_live(id, target) {
            debug!(dispatch = %id, target, "ignoring stale dispatch event");
            return false;
        }

        match event {
            DispatchEvent::Partial(text) => {
                self.store.set_accumulator(text);
            }
            DispatchEvent::Complete(completion) => {
                if completion.end == StreamEnd::Cancelled {
                    self.store.cancel(target);
                } else {
                    self.store.finalize(target, &completion.text, completion.elapsed);
                    if let Some(reason) = completion.degraded() {
                        warn!(dispatch = %id, reason, "response truncated");
                        self.store.mark_truncated(target, reason);
                        self.status =
                            Some(StatusMessage::warning(format!("response truncated: {reason}")));
                    }
                    // Something came back, so the model is resident.
                    self.availability.on_status(true, false, now);
                }
                self.settle(target);
            }
            DispatchEvent::Failure(cause) => {
                warn!(dispatch = %id, cause = %cause, "dispatch failed");
                self.store.fail(target, &cause);
                self.status = Some(StatusMessage::error(cause));
                self.settle(target);
            }
        }
        true
    }

    fn settle(&mut self, target: usize) {
        self.active = None;
        self.cancellation.release();
        self.store.clear_accumulator();
        self.availability.stop();
        self.mode.on_dispatch_settled();
        if self.store.current_index() == Some(target) {
            self.navigator.scroll_to_top();
        }
    }

    /// Periodic timer; asks for a model status query while loading.
    pub fn tick(&self) -> Vec<Effect> {
        if self.availability.is_loading() {
            vec![Effect::PollModelStatus(self.availability.name().to_string())]
        } else {
            Vec::new()
        }
    }

    pub fn on_model_status(&mut self, result: Result<bool, String>, now: Instant) {
        match result {
            Ok(loaded) => {
                let active = self.active.is_some();
                self.availability.on_status(loaded, active, now);
            }
            Err(cause) => {
                warn!(model = self.availability.name(), cause = %cause, "model status query failed");
                self.availability.stop();
                self.status = Some(StatusMessage::error(cause));
            }
        }
    }

    /// Startup detection. Adopts the first running model, if any.
    pub fn on_running_models(&mut self, result: Result<Vec<String>, String>) -> Vec<Effect> {
        match result {
            Ok(_) if !self.store.is_empty() => {
                debug!("running models reply arrived after the first turn; keeping model");
                Vec::new()
            }
            Ok(models) => match models.into_iter().next() {
                Some(name) => {
                    info!(model = %name, "adopting running model");
                    self.availability.adopt(name.clone());
                    vec![Effect::PersistModel(name)]
                }
                None => Vec::new(),
            },
            Err(cause) => {
                warn!(cause = %cause, "running models query failed");
                self.status = Some(StatusMessage::error(cause));
                Vec::new()
            }
        }
    }
}

use std::io;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures_util::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tama_ai::{DispatchEvent, OllamaClient, stream_chat};
use tama_core::{
    Command, DispatchId, DispatchRequest, Effect, LastModelStore, Mode, Session, SessionError,
    StatusMessage,
};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::editor::ComposeEditor;
use crate::keybindings::keybinding_label;
use crate::keymap::{KeyMap, KeyOutcome};
use crate::render::{FrameContext, render_ui};
use crate::terminal::TerminalRestore;
use crate::TuiOptions;

/// Everything background tasks report back. The event loop is the only
/// consumer and the only writer of session state.
#[derive(Debug)]
pub(crate) enum AppEvent {
    Dispatch {
        id: DispatchId,
        target: usize,
        event: DispatchEvent,
    },
    ModelStatus(Result<bool, String>),
    RunningModels(Result<Vec<String>, String>),
}

pub(crate) enum RuntimeControl {
    Continue,
    Exit,
}

pub(crate) struct TuiRuntime {
    client: OllamaClient,
    model_store: Arc<dyn LastModelStore>,
    options: TuiOptions,
    session: Session,
    editor: ComposeEditor,
    keymap: KeyMap,
    inbox_tx: mpsc::UnboundedSender<AppEvent>,
    inbox_rx: mpsc::UnboundedReceiver<AppEvent>,
    status_query_in_flight: bool,
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    events: EventStream,
    _restore: TerminalRestore,
}

impl TuiRuntime {
    pub(crate) fn new(
        client: OllamaClient,
        session: Session,
        model_store: Arc<dyn LastModelStore>,
        options: TuiOptions,
    ) -> Result<Self, String> {
        let restore = TerminalRestore::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
            .map_err(|error| format!("create terminal failed: {error}"))?;
        terminal
            .clear()
            .map_err(|error| format!("clear terminal failed: {error}"))?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Ok(Self {
            client,
            model_store,
            keymap: KeyMap::new(&options.keybindings),
            options,
            session,
            editor: ComposeEditor::new(),
            inbox_tx,
            inbox_rx,
            status_query_in_flight: false,
            terminal,
            events: EventStream::new(),
            _restore: restore,
        })
    }

    pub(crate) async fn run(&mut self) -> Result<(), String> {
        self.spawn_running_models_query();

        let mut ticker = tokio::time::interval(self.options.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut needs_redraw = true;

        loop {
            if needs_redraw {
                self.draw_ui()?;
                needs_redraw = false;
            }

            tokio::select! {
                maybe_event = self.events.next() => {
                    let Some(event_result) = maybe_event else {
                        return Ok(());
                    };
                    let event = event_result
                        .map_err(|error| format!("read terminal event failed: {error}"))?;
                    match self.handle_terminal_event(event) {
                        Some(RuntimeControl::Exit) => return Ok(()),
                        Some(RuntimeControl::Continue) => needs_redraw = true,
                        None => {}
                    }
                }
                maybe_update = self.inbox_rx.recv() => {
                    if let Some(update) = maybe_update {
                        if let RuntimeControl::Exit = self.handle_app_event(update) {
                            return Ok(());
                        }
                        needs_redraw = true;
                    }
                }
                _ = ticker.tick() => {
                    let effects = self.session.tick();
                    if let RuntimeControl::Exit = self.run_effects(effects) {
                        return Ok(());
                    }
                    needs_redraw = self.session.activity(Instant::now()).is_some();
                }
            }
        }
    }

    fn draw_ui(&mut self) -> Result<(), String> {
        let context = FrameContext {
            editor: &self.editor,
            options: &self.options,
            pending_prefix: self.keymap.has_pending_prefix(),
            now: Instant::now(),
        };
        let session = &mut self.session;
        self.terminal
            .draw(|frame| render_ui(frame, session, &context))
            .map(|_| ())
            .map_err(|error| format!("draw UI failed: {error}"))
    }

    /// `None` when nothing visible changed.
    fn handle_terminal_event(&mut self, event: Event) -> Option<RuntimeControl> {
        match event {
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                Some(self.dispatch_key_event(key))
            }
            Event::Paste(pasted) => {
                if self.session.mode() == Mode::Compose {
                    self.editor.insert_text(&pasted);
                }
                Some(RuntimeControl::Continue)
            }
            // The next frame measures the new viewport.
            Event::Resize(_, _) => Some(RuntimeControl::Continue),
            _ => None,
        }
    }

    fn dispatch_key_event(&mut self, key: KeyEvent) -> RuntimeControl {
        self.session.dismiss_status();
        match self.keymap.dispatch(self.session.mode(), key, &mut self.editor) {
            KeyOutcome::Command(command) => self.apply_command(command),
            KeyOutcome::Redraw | KeyOutcome::Ignored => RuntimeControl::Continue,
        }
    }

    fn apply_command(&mut self, command: Command) -> RuntimeControl {
        debug!(?command, "applying command");
        match self.session.handle(command, Instant::now()) {
            Ok(effects) => self.run_effects(effects),
            Err(SessionError::DispatchActive) => {
                self.session.set_status(StatusMessage::info(format!(
                    "waiting for response, {} to cancel",
                    keybinding_label(&self.options.keybindings.interrupt)
                )));
                RuntimeControl::Continue
            }
            Err(error) => {
                debug!(%error, "command rejected");
                RuntimeControl::Continue
            }
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) -> RuntimeControl {
        let now = Instant::now();
        match event {
            AppEvent::Dispatch { id, target, event } => {
                self.session.on_dispatch_event(id, target, event, now);
                RuntimeControl::Continue
            }
            AppEvent::ModelStatus(result) => {
                self.status_query_in_flight = false;
                self.session.on_model_status(result, now);
                RuntimeControl::Continue
            }
            AppEvent::RunningModels(result) => {
                let effects = self.session.on_running_models(result);
                self.run_effects(effects)
            }
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> RuntimeControl {
        for effect in effects {
            match effect {
                Effect::Dispatch(request) => self.spawn_dispatch(request),
                Effect::PersistModel(model) => {
                    if let Err(error) = self.model_store.persist(&model) {
                        warn!(%model, %error, "persist last model failed");
                        self.session.set_status(StatusMessage::warning(format!(
                            "could not save last model: {error}"
                        )));
                    }
                }
                Effect::PollModelStatus(model) => self.spawn_model_status_query(model),
                Effect::Exit => return RuntimeControl::Exit,
            }
        }
        RuntimeControl::Continue
    }

    fn spawn_dispatch(&self, request: DispatchRequest) {
        let client = self.client.clone();
        let inbox = self.inbox_tx.clone();
        let DispatchRequest {
            id,
            target,
            request,
            signal,
        } = request;
        tokio::spawn(async move {
            stream_chat(&client, &request, signal, |event| {
                let _ = inbox.send(AppEvent::Dispatch { id, target, event });
            })
            .await;
        });
    }

    /// At most one status query at a time; ticks that arrive meanwhile are dropped.
    fn spawn_model_status_query(&mut self, model: String) {
        if self.status_query_in_flight {
            return;
        }
        self.status_query_in_flight = true;
        let client = self.client.clone();
        let inbox = self.inbox_tx.clone();
        tokio::spawn(async move {
            let result = client
                .is_model_loaded(&model)
                .await
                .map_err(|error| error.to_string());
            let _ = inbox.send(AppEvent::ModelStatus(result));
        });
    }

    fn spawn_running_models_query(&self) {
        let client = self.client.clone();
        let inbox = self.inbox_tx.clone();
        tokio::spawn(async move {
            let result = client
                .running_models()
                .await
                .map_err(|error| error.to_string());
            let _ = inbox.send(AppEvent::RunningModels(result));
        });
    }
}

use tama_ai::{AbortController, AbortSignal};

/// Owns the token of the one dispatch that may be in flight.
#[derive(Default)]
pub struct CancellationController {
    active: Option<AbortController>,
}

impl CancellationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Creates a fresh token, discarding any previous one.
    pub fn begin_dispatch(&mut self) -> AbortSignal {
        let controller = AbortController::new();
        let signal = controller.signal();
        self.active = Some(controller);
        signal
    }

    /// Signals and drops the held token. Returns whether one was held.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(controller) => {
                controller.abort();
                true
            }
            None => false,
        }
    }

    /// Drops the held token without signalling; the dispatch ended on its own.
    pub fn release(&mut self) {
        self.active = None;
    }
}

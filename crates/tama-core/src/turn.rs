use std::time::Duration;

/// One request/response exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Turn {
    request: String,
    response: String,
    duration: Option<Duration>,
    cancelled: bool,
    failure: Option<String>,
    truncated: Option<String>,
}

impl Turn {
    pub(crate) fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            ..Self::default()
        }
    }

    pub fn request(&self) -> &str {
        &self.request
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    /// Set once, when the response is finalized.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Reason the stream ended early, for responses finalized from a
    /// truncated stream.
    pub fn truncated(&self) -> Option<&str> {
        self.truncated.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.duration.is_none() && !self.cancelled && self.failure.is_none()
    }

    /// Whether this turn is part of the model's context for later requests.
    pub fn counts_in_history(&self) -> bool {
        !self.cancelled && self.failure.is_none()
    }

    pub(crate) fn finalize(&mut self, response: &str, duration: Duration) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.response = response.trim().to_string();
        self.duration = Some(duration);
        true
    }

    pub(crate) fn mark_truncated(&mut self, reason: impl Into<String>) {
        self.truncated = Some(reason.into());
    }

    pub(crate) fn cancel(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.cancelled = true;
        true
    }

    pub(crate) fn fail(&mut self, cause: impl Into<String>) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.failure = Some(cause.into());
        true
    }
}

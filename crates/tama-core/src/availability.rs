use std::time::{Duration, Instant};

/// What the status line timer is counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity {
    LoadingModel(Duration),
    WaitingForResponse(Duration),
}

/// Whether the selected model is resident on the server, fed by polling the
/// running-models endpoint. Purely informational.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelAvailability {
    name: String,
    loaded: bool,
    loading_since: Option<Instant>,
    waiting_since: Option<Instant>,
}

impl ModelAvailability {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loaded: false,
            loading_since: None,
            waiting_since: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_loading(&self) -> bool {
        self.loading_since.is_some()
    }

    /// A running model found at startup replaces the configured one.
    pub fn adopt(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.loaded = true;
    }

    pub fn begin_loading(&mut self, now: Instant) {
        self.loaded = false;
        self.loading_since = Some(now);
        self.waiting_since = None;
    }

    pub fn on_status(&mut self, loaded: bool, dispatch_active: bool, now: Instant) {
        self.loaded = loaded;
        if !loaded || self.loading_since.is_none() {
            return;
        }
        self.loading_since = None;
        if dispatch_active {
            self.waiting_since = Some(now);
        }
    }

    pub fn stop(&mut self) {
        self.loading_since = None;
        self.waiting_since = None;
    }

    pub fn activity(&self, now: Instant) -> Option<Activity> {
        if let Some(since) = self.loading_since {
            return Some(Activity::LoadingModel(now.saturating_duration_since(since)));
        }
        self.waiting_since
            .map(|since| Activity::WaitingForResponse(now.saturating_duration_since(since)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_turns_into_waiting_once_model_is_resident() {
        let start = Instant::now();
        let mut availability = ModelAvailability::new("llama3");
        availability.begin_loading(start);
        assert!(availability.is_loading());

        availability.on_status(false, true, start + Duration::from_millis(100));
        assert_eq!(
            availability.activity(start + Duration::from_millis(500)),
            Some(Activity::LoadingModel(Duration::from_millis(500)))
        );

        let loaded_at = start + Duration::from_secs(1);
        availability.on_status(true, true, loaded_at);
        assert!(availability.is_loaded());
        assert!(!availability.is_loading());
        assert_eq!(
            availability.activity(loaded_at + Duration::from_secs(2)),
            Some(Activity::WaitingForResponse(Duration::from_secs(2)))
        );

        availability.stop();
        assert_eq!(availability.activity(loaded_at), None);
    }

    #[test]
    fn loaded_without_dispatch_starts_no_timer() {
        let now = Instant::now();
        let mut availability = ModelAvailability::new("llama3");
        availability.begin_loading(now);
        availability.on_status(true, false, now);
        assert_eq!(availability.activity(now), None);
    }

    #[test]
    fn adopt_replaces_name_and_marks_loaded() {
        let mut availability = ModelAvailability::new("gpt-oss:20b");
        availability.adopt("qwen3:8b");
        assert_eq!(availability.name(), "qwen3:8b");
        assert!(availability.is_loaded());
    }
}

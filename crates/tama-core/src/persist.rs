use std::sync::Mutex;

/// Where the last-used model name survives between runs.
pub trait LastModelStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn persist(&self, model: &str) -> Result<(), String>;
}

/// In-process store, for tests and for runs that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    model: Mutex<Option<String>>,
}

impl MemoryModelStore {
    pub fn new(model: Option<String>) -> Self {
        Self {
            model: Mutex::new(model),
        }
    }
}

impl LastModelStore for MemoryModelStore {
    fn load(&self) -> Option<String> {
        self.model
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    fn persist(&self, model: &str) -> Result<(), String> {
        let mut guard = self
            .model
            .lock()
            .map_err(|_| "model store lock poisoned".to_string())?;
        *guard = Some(model.to_string());
        Ok(())
    }
}

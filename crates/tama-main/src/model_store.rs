use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tama_core::LastModelStore;
use tracing::warn;

use crate::paths;

const LAST_MODEL_FILE_NAME: &str = "last-model";

/// Last-used model name in a one-line text file under the XDG data dir.
#[derive(Debug, Clone)]
pub struct XdgModelStore {
    path: PathBuf,
}

impl XdgModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_location() -> Self {
        Self::new(paths::default_data_dir().join(LAST_MODEL_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LastModelStore for XdgModelStore {
    fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let model = content.trim();
                (!model.is_empty()).then(|| model.to_string())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => None,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "read last model failed");
                None
            }
        }
    }

    fn persist(&self, model: &str) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| format!("create {} failed: {error}", parent.display()))?;
        }
        fs::write(&self.path, format!("{}\n", model.trim()))
            .map_err(|error| format!("write {} failed: {error}", self.path.display()))
    }
}

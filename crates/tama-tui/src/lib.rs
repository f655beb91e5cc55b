//! Terminal front end: owns the event loop, maps keys to session commands
//! per mode, and renders the displayed turn.

use std::sync::Arc;

use tama_ai::OllamaClient;
use tama_core::{LastModelStore, Session};

mod editor;
pub mod keybindings;
mod keymap;
mod markdown;
pub mod options;
mod render;
mod runtime;
mod terminal;
pub mod theme;

pub use keybindings::{KeyBinding, TuiKeyBindings, parse_key_id};
pub use options::TuiOptions;
pub use theme::TuiTheme;

use runtime::TuiRuntime;

/// Takes over the terminal until the user quits. The terminal is restored on
/// every exit path, including errors.
pub async fn run_tui(
    client: OllamaClient,
    session: Session,
    model_store: Arc<dyn LastModelStore>,
    options: TuiOptions,
) -> Result<(), String> {
    let mut runtime = TuiRuntime::new(client, session, model_store, options)?;
    runtime.run().await
}

#[cfg(test)]
#[path = "../tests/unit/lib_unit.rs"]
mod tests;

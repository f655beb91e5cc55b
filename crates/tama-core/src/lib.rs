//! Session state machine for a turn-based chat client.
//!
//! All mutable state lives in [`Session`], which is owned by a single event
//! loop. Background dispatches only ever report back through
//! [`Session::on_dispatch_event`].

mod availability;
mod cancel;
mod command;
mod error;
mod mode;
mod navigator;
mod persist;
mod session;
mod store;
mod turn;

pub use availability::{Activity, ModelAvailability};
pub use cancel::CancellationController;
pub use command::{Command, InputAction, parse_input};
pub use error::SessionError;
pub use mode::{Mode, ModeMachine};
pub use navigator::Navigator;
pub use persist::{LastModelStore, MemoryModelStore};
pub use session::{DispatchId, DispatchRequest, Effect, Session, StatusLevel, StatusMessage};
pub use store::TurnStore;
pub use turn::Turn;

//! Session synchronization and structured commands

mod command;
mod coordinator;

pub use command::{Action, Command};
pub use coordinator::{Broadcaster, Discard, RenderSink, SyncCoordinator, SyncState};

//! Command interpreter and shell session for the neosite terminal.
//!
//! The shell is a registry-based dispatch system. Commands implement the
//! [`Command`] trait and are registered by name; the [`ShellSession`] parses
//! submitted lines, handles the session-level builtins (`cd`, `clear`,
//! `help`, `history`), dispatches everything else, and records scrollback.
//! Interactive sub-programs (editor, ping, process monitor) are explicit
//! takeover tasks with cancellation tokens, driven by the hosting UI.

mod admin_commands;
mod auth_commands;
mod complete;
mod fs_commands;
mod interpreter;
mod net_commands;
mod note_commands;
mod session;
mod takeover;

pub use admin_commands::register_admin_commands;
pub use auth_commands::register_auth_commands;
pub use complete::complete;
pub use fs_commands::register_fs_commands;
pub use interpreter::{
    Command, CommandOutput, CommandRegistry, Environment, Identity, OWNER, SESSION_BUILTINS,
    VISITOR,
};
pub use net_commands::register_net_commands;
pub use note_commands::register_note_commands;
pub use session::{HistoryEntry, Services, ShellSession};
pub use takeover::{CancelToken, EditorSession, MonitorTask, PingTask, Takeover};

/// Register the full built-in command set into a registry.
pub fn register_builtins(reg: &mut CommandRegistry) {
    register_fs_commands(reg);
    register_auth_commands(reg);
    register_note_commands(reg);
    register_net_commands(reg);
    register_admin_commands(reg);
}

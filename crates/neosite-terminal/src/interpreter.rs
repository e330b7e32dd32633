//! Command trait, registry, and the execution environment.

use std::collections::HashMap;

use neosite_api::{AdminApi, AuthService, InboxService, LatencyProbe, NotesStore, WeatherService};
use neosite_platform::{Clock, SettingsStore};
use neosite_types::error::{Result, SiteError};
use neosite_vfs::FileTree;

use crate::takeover::Takeover;

/// Default low-privilege user name.
pub const VISITOR: &str = "visitor";
/// Elevated owner user name.
pub const OWNER: &str = "neo";

/// The active user identity of a shell session.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub name: String,
    pub elevated: bool,
}

impl Identity {
    pub fn visitor() -> Self {
        Self {
            name: VISITOR.to_string(),
            elevated: false,
        }
    }

    pub fn owner() -> Self {
        Self {
            name: OWNER.to_string(),
            elevated: true,
        }
    }
}

/// Output produced by a command.
///
/// A tagged type instead of truthiness checks: the dispatcher appends
/// `Text`, echoes the bare command line for `None`, and parks `Takeover`
/// for the hosting UI.
#[derive(Debug)]
pub enum CommandOutput {
    /// Plain text appended to scrollback.
    Text(String),
    /// No visible output beyond the echoed command line.
    None,
    /// Full-screen takeover request (editor, ping, process monitor).
    Takeover(Takeover),
}

/// Shared mutable environment passed to every command.
///
/// Services are optional; commands render a "service unavailable" line
/// when the one they need is absent.
pub struct Environment<'a> {
    /// Current working directory segments (read-only; only `cd` moves it).
    pub cwd: &'a [String],
    /// The virtual file tree. Mutations replace it copy-on-write.
    pub tree: &'a mut FileTree,
    /// Active user identity.
    pub identity: &'a mut Identity,
    /// Stored bearer token, if logged in.
    pub token: &'a mut Option<String>,
    /// Whether the inline input prompt is currently shown.
    pub prompt_visible: &'a mut bool,
    pub clock: Option<&'a dyn Clock>,
    pub settings: Option<&'a SettingsStore>,
    pub notes: Option<&'a dyn NotesStore>,
    pub auth: Option<&'a dyn AuthService>,
    pub inbox: Option<&'a dyn InboxService>,
    pub admin: Option<&'a dyn AdminApi>,
    pub weather: Option<&'a dyn WeatherService>,
    pub probe: Option<&'a dyn LatencyProbe>,
}

/// A single executable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ls \[-a\] \[-l\] \[-h\] \[path\]").
    fn usage(&self) -> &str;

    /// Command category for grouping in `help` output.
    fn category(&self) -> &str {
        "general"
    }

    /// Execute the command with the given arguments and environment.
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput>;
}

/// Builtins handled by the session before registry dispatch, listed here so
/// `help` and tab completion still know about them.
pub const SESSION_BUILTINS: [(&str, &str, &str); 4] = [
    ("cd", "Change working directory", "cd [path]"),
    ("clear", "Clear the terminal scrollback", "clear"),
    ("help", "List available commands", "help [command]"),
    ("history", "Show submitted command history", "history"),
];

/// Registry of available commands with lookup and completion.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    /// Look up a command by exact name.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|cmd| &**cmd)
    }

    /// Return a sorted list of (name, description) pairs.
    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        let mut cmds: Vec<(&str, &str)> = self
            .commands
            .values()
            .map(|c| (c.name(), c.description()))
            .collect();
        cmds.sort_by_key(|(name, _)| *name);
        cmds
    }

    /// Sorted completions for a partial command name, including the
    /// session-level builtins.
    pub fn completions(&self, partial: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .keys()
            .filter(|name| name.starts_with(partial))
            .cloned()
            .collect();
        for (name, _, _) in &SESSION_BUILTINS {
            if name.starts_with(partial) {
                names.push((*name).to_string());
            }
        }
        names.sort();
        names.dedup();
        names
    }

    /// Render `help` output: the full listing, or detail for one command.
    pub fn render_help(&self, args: &[&str]) -> String {
        if let Some(&name) = args.first() {
            if let Some(cmd) = self.commands.get(name) {
                return format!(
                    "{} ({})\n  {}\n  Usage: {}",
                    cmd.name(),
                    cmd.category(),
                    cmd.description(),
                    cmd.usage()
                );
            }
            if let Some((bname, desc, usage)) =
                SESSION_BUILTINS.iter().find(|(n, _, _)| *n == name)
            {
                return format!("{bname} (builtin)\n  {desc}\n  Usage: {usage}");
            }
            return format!("help: no such command: {name}");
        }

        let mut categories: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
        for &(name, desc, _) in &SESSION_BUILTINS {
            categories.entry("builtin").or_default().push((name, desc));
        }
        for cmd in self.commands.values() {
            categories
                .entry(cmd.category())
                .or_default()
                .push((cmd.name(), cmd.description()));
        }

        let mut cats: Vec<&str> = categories.keys().copied().collect();
        cats.sort();

        let total: usize = categories.values().map(|v| v.len()).sum();
        let mut out = format!("Commands ({total}):\n");
        for cat in &cats {
            let mut cmds = categories.get(cat).unwrap().clone();
            cmds.sort_by_key(|(name, _)| *name);
            out.push_str(&format!("\n  [{cat}]\n"));
            for (name, desc) in &cmds {
                out.push_str(&format!("    {name:12} {desc}\n"));
            }
        }
        out.push_str("\nType 'help <command>' for details.");
        out
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Gate an owner-only command: elevated identity AND a stored token.
/// Returns the token, or the rendered "permission denied" line.
pub(crate) fn require_session(
    env: &Environment<'_>,
    cmd: &str,
) -> std::result::Result<String, String> {
    match env.token.as_deref() {
        Some(token) if env.identity.elevated => Ok(token.to_string()),
        _ => Err(format!(
            "{cmd}: permission denied (try 'login <password>' first)"
        )),
    }
}

/// Convert a service error into the rendered line for `cmd`, clearing the
/// stored session token when a bearer-gated endpoint answered 401.
pub(crate) fn render_service_error(
    token: &mut Option<String>,
    cmd: &str,
    err: SiteError,
) -> String {
    match err {
        SiteError::Unauthorized(_) => {
            log::info!("{cmd}: 401 from server, clearing session token");
            *token = None;
            format!("{cmd}: permission denied, session expired")
        },
        other => format!("Error: {other}"),
    }
}

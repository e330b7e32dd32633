//! The shell session: scrollback, input recall, working directory, and the
//! per-line dispatch state machine.

use std::rc::Rc;

use neosite_api::{AdminApi, AuthService, InboxService, LatencyProbe, NotesStore, WeatherService};
use neosite_platform::{Clock, SettingsStore};
use neosite_vfs::{FileTree, HOME_SEGMENTS, display_path, resolve_segments};

use crate::complete;
use crate::interpreter::{CommandOutput, CommandRegistry, Environment, Identity};
use crate::takeover::{EditorSession, Takeover};

/// One scrollback entry: the echoed command line plus its rendered response
/// and the prompt context it was typed under. Append-only; never mutated
/// after creation; `clear` wipes the whole list.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: u64,
    pub command: String,
    pub response: String,
    pub path: String,
    pub user: String,
}

/// External collaborators handed to the session per submission.
///
/// Everything is optional; a command whose service is absent renders a
/// "service unavailable" line instead of failing.
#[derive(Default, Clone, Copy)]
pub struct Services<'a> {
    pub clock: Option<&'a dyn Clock>,
    pub settings: Option<&'a SettingsStore>,
    pub notes: Option<&'a dyn NotesStore>,
    pub auth: Option<&'a dyn AuthService>,
    pub inbox: Option<&'a dyn InboxService>,
    pub admin: Option<&'a dyn AdminApi>,
    pub weather: Option<&'a dyn WeatherService>,
    pub probe: Option<&'a dyn LatencyProbe>,
}

/// Interactive shell session state.
pub struct ShellSession {
    registry: Rc<CommandRegistry>,
    tree: FileTree,
    cwd: Vec<String>,
    identity: Identity,
    token: Option<String>,
    prompt_visible: bool,
    entries: Vec<HistoryEntry>,
    next_id: u64,
    input_history: Vec<String>,
    recall: Option<usize>,
    takeover: Option<Takeover>,
}

impl ShellSession {
    /// Start a session in the home directory with the given command set.
    pub fn new(registry: Rc<CommandRegistry>, tree: FileTree) -> Self {
        Self {
            registry,
            tree,
            cwd: HOME_SEGMENTS.iter().map(|s| s.to_string()).collect(),
            identity: Identity::visitor(),
            token: None,
            prompt_visible: true,
            entries: Vec::new(),
            next_id: 0,
            input_history: Vec::new(),
            recall: None,
            takeover: None,
        }
    }

    // -- Accessors --

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn cwd(&self) -> &[String] {
        &self.cwd
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn prompt_visible(&self) -> bool {
        self.prompt_visible
    }

    /// Prompt string context for the UI, e.g. `visitor@neosite:~`.
    pub fn prompt(&self) -> String {
        format!("{}@neosite:{}", self.identity.name, display_path(&self.cwd))
    }

    // -- Takeover lifecycle --

    /// Take a parked takeover request, if the last command requested one.
    pub fn take_takeover(&mut self) -> Option<Takeover> {
        self.takeover.take()
    }

    /// Append host-produced output (takeover task lines) to scrollback.
    pub fn append_output(&mut self, response: &str) {
        self.push_entry("", response.to_string());
    }

    /// Restore the prompt after a takeover task finishes or is cancelled.
    pub fn finish_takeover(&mut self) {
        self.prompt_visible = true;
    }

    /// Apply an editor save against this session's tree and record the
    /// status line in scrollback.
    pub fn save_editor(&mut self, editor: &EditorSession, services: &Services<'_>) {
        let line = match editor.save(&mut self.tree, services.notes, services.clock) {
            Ok(status) => status,
            Err(e) => format!("nano: {e}"),
        };
        self.push_entry("", line);
    }

    // -- Input recall --

    /// Recall the previous submitted line (up arrow).
    pub fn recall_prev(&mut self) -> Option<&str> {
        if self.input_history.is_empty() {
            return None;
        }
        let idx = match self.recall {
            None => self.input_history.len() - 1,
            Some(0) => 0,
            Some(i) => i - 1,
        };
        self.recall = Some(idx);
        Some(&self.input_history[idx])
    }

    /// Recall the next submitted line (down arrow). `None` past the newest
    /// entry means an empty input buffer.
    pub fn recall_next(&mut self) -> Option<&str> {
        match self.recall {
            Some(i) if i + 1 < self.input_history.len() => {
                self.recall = Some(i + 1);
                Some(&self.input_history[i + 1])
            },
            Some(_) => {
                self.recall = None;
                None
            },
            None => None,
        }
    }

    /// Raw submitted lines, oldest first.
    pub fn input_history(&self) -> &[String] {
        &self.input_history
    }

    // -- Tab completion --

    /// Complete the current input buffer, or return it unchanged.
    pub fn complete(&self, input: &str) -> String {
        complete::complete(input, &self.registry, &self.tree, &self.cwd)
    }

    // -- Submission --

    /// Submit a typed command line.
    pub fn submit(&mut self, line: &str, services: &Services<'_>) {
        self.run_line(line, services, false);
    }

    /// Submit a programmatic replay: not recorded in input recall, and a
    /// blank line records nothing.
    pub fn replay(&mut self, line: &str, services: &Services<'_>) {
        self.run_line(line, services, true);
    }

    fn run_line(&mut self, line: &str, services: &Services<'_>, replay: bool) {
        let trimmed = line.trim().to_string();
        if trimmed.is_empty() {
            if !replay {
                self.push_entry("", String::new());
            }
            return;
        }

        if !replay {
            self.input_history.push(trimmed.clone());
            self.recall = None;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        match tokens[0] {
            "clear" => {
                self.entries.clear();
            },
            "cd" => {
                self.do_cd(&trimmed, tokens.get(1).copied());
            },
            "help" => {
                let text = self.registry.render_help(&tokens[1..]);
                self.push_entry(&trimmed, text);
            },
            "history" => {
                let text = self.render_input_history();
                self.push_entry(&trimmed, text);
            },
            _ => {
                self.dispatch(&trimmed, &tokens, services);
            },
        }
    }

    /// `cd`: commit the working directory only after the target is
    /// confirmed to be an existing directory. No argument resets to home.
    fn do_cd(&mut self, line: &str, arg: Option<&str>) {
        let target = arg.unwrap_or("~");
        let segments = resolve_segments(&self.cwd, target);
        match self.tree.node_at(&segments).map(|node| node.is_dir()) {
            Some(true) => {
                self.push_entry(line, String::new());
                self.cwd = segments;
            },
            Some(false) => {
                self.push_entry(line, format!("cd: not a directory: {target}"));
            },
            None => {
                self.push_entry(line, format!("cd: no such file or directory: {target}"));
            },
        }
    }

    fn render_input_history(&self) -> String {
        if self.input_history.is_empty() {
            return "(no history)".to_string();
        }
        let mut out = String::new();
        for (i, entry) in self.input_history.iter().enumerate() {
            out.push_str(&format!("  {:4}  {entry}\n", i + 1));
        }
        out.trim_end().to_string()
    }

    fn dispatch(&mut self, line: &str, tokens: &[&str], services: &Services<'_>) {
        let name = tokens[0];
        let registry = Rc::clone(&self.registry);
        let Some(command) = registry.get(name) else {
            self.push_entry(line, format!("{name}: command not found"));
            return;
        };

        let mut env = Environment {
            cwd: &self.cwd,
            tree: &mut self.tree,
            identity: &mut self.identity,
            token: &mut self.token,
            prompt_visible: &mut self.prompt_visible,
            clock: services.clock,
            settings: services.settings,
            notes: services.notes,
            auth: services.auth,
            inbox: services.inbox,
            admin: services.admin,
            weather: services.weather,
            probe: services.probe,
        };

        // A handler fault never crashes the shell loop.
        match command.execute(&tokens[1..], &mut env) {
            Ok(CommandOutput::Text(text)) => self.push_entry(line, text),
            Ok(CommandOutput::None) => self.push_entry(line, String::new()),
            Ok(CommandOutput::Takeover(takeover)) => {
                self.push_entry(line, String::new());
                self.takeover = Some(takeover);
            },
            Err(e) => {
                log::warn!("handler fault in '{name}': {e}");
                self.push_entry(line, format!("Error executing '{name}': {e}"));
            },
        }
    }

    fn push_entry(&mut self, command: &str, response: String) {
        let entry = HistoryEntry {
            id: self.next_id,
            command: command.to_string(),
            response,
            path: display_path(&self.cwd),
            user: self.identity.name.clone(),
        };
        self.next_id += 1;
        self.entries.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{Command, CommandOutput};
    use crate::register_builtins;
    use neosite_api::MemoryApi;
    use neosite_platform::{ManualClock, MemoryKv};
    use neosite_types::error::{Result, SiteError};

    fn segs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn seeded_tree() -> FileTree {
        let mut tree = FileTree::new();
        tree.mkdir("/home/neo/projects").unwrap();
        tree.mkdir("/home/neo/visitors_notes").unwrap();
        tree.seed("/home/neo/about.txt", neosite_vfs::FileData::text("it's me"))
            .unwrap();
        tree
    }

    fn new_session() -> ShellSession {
        let mut reg = CommandRegistry::new();
        register_builtins(&mut reg);
        ShellSession::new(Rc::new(reg), seeded_tree())
    }

    fn memory_api() -> (Rc<ManualClock>, MemoryApi) {
        let clock = Rc::new(ManualClock::new(1_000_000));
        let kv = Rc::new(MemoryKv::new(Rc::clone(&clock) as Rc<dyn Clock>));
        let api = MemoryApi::new("redpill", Rc::clone(&clock) as Rc<dyn Clock>, kv);
        (clock, api)
    }

    #[test]
    fn starts_in_home() {
        let session = new_session();
        assert_eq!(session.cwd(), segs(&["home", "neo"]).as_slice());
        assert_eq!(session.prompt(), "visitor@neosite:~");
    }

    #[test]
    fn empty_line_records_blank_entry() {
        let mut session = new_session();
        session.submit("   ", &Services::default());
        assert_eq!(session.entries().len(), 1);
        assert_eq!(session.entries()[0].command, "");
        assert_eq!(session.entries()[0].response, "");
    }

    #[test]
    fn empty_replay_records_nothing() {
        let mut session = new_session();
        session.replay("", &Services::default());
        assert!(session.entries().is_empty());
    }

    #[test]
    fn unknown_command() {
        let mut session = new_session();
        session.submit("frobnicate", &Services::default());
        assert_eq!(
            session.entries()[0].response,
            "frobnicate: command not found"
        );
    }

    #[test]
    fn cd_into_subdirectory_and_back() {
        let mut session = new_session();
        session.submit("cd projects", &Services::default());
        assert_eq!(session.cwd(), segs(&["home", "neo", "projects"]).as_slice());
        // Entry echoes the prompt path from before the move.
        assert_eq!(session.entries()[0].path, "~");
        session.submit("cd ..", &Services::default());
        assert_eq!(session.cwd(), segs(&["home", "neo"]).as_slice());
    }

    #[test]
    fn cd_nonexistent_leaves_cwd_and_appends_one_entry() {
        let mut session = new_session();
        session.submit("cd nonexistent", &Services::default());
        assert_eq!(session.cwd(), segs(&["home", "neo"]).as_slice());
        assert_eq!(session.entries().len(), 1);
        assert!(
            session.entries()[0]
                .response
                .contains("no such file or directory")
        );
    }

    #[test]
    fn cd_to_file_is_not_a_directory() {
        let mut session = new_session();
        session.submit("cd about.txt", &Services::default());
        assert!(session.entries()[0].response.contains("not a directory"));
    }

    #[test]
    fn cd_without_args_resets_to_home() {
        let mut session = new_session();
        session.submit("cd /", &Services::default());
        assert_eq!(session.cwd(), Vec::<String>::new().as_slice());
        session.submit("cd", &Services::default());
        assert_eq!(session.cwd(), segs(&["home", "neo"]).as_slice());
    }

    #[test]
    fn clear_wipes_scrollback() {
        let mut session = new_session();
        session.submit("pwd", &Services::default());
        session.submit("pwd", &Services::default());
        assert_eq!(session.entries().len(), 2);
        session.submit("clear", &Services::default());
        assert!(session.entries().is_empty());
        // But input recall survives.
        assert_eq!(session.input_history().len(), 3);
    }

    #[test]
    fn typed_commands_feed_input_recall_most_recent_last() {
        let mut session = new_session();
        session.submit("pwd", &Services::default());
        session.submit("whoami", &Services::default());
        assert_eq!(session.recall_prev(), Some("whoami"));
        assert_eq!(session.recall_prev(), Some("pwd"));
        assert_eq!(session.recall_prev(), Some("pwd"));
        assert_eq!(session.recall_next(), Some("whoami"));
        assert_eq!(session.recall_next(), None);
    }

    #[test]
    fn replays_are_not_recalled() {
        let mut session = new_session();
        session.replay("pwd", &Services::default());
        assert!(session.input_history().is_empty());
        assert_eq!(session.entries().len(), 1);
    }

    #[test]
    fn handler_fault_is_rendered_not_propagated() {
        struct BoomCmd;
        impl Command for BoomCmd {
            fn name(&self) -> &str {
                "boom"
            }
            fn description(&self) -> &str {
                "Always fails"
            }
            fn usage(&self) -> &str {
                "boom"
            }
            fn execute(
                &self,
                _args: &[&str],
                _env: &mut Environment<'_>,
            ) -> Result<CommandOutput> {
                Err(SiteError::Command("kaput".to_string()))
            }
        }
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(BoomCmd));
        let mut session = ShellSession::new(Rc::new(reg), seeded_tree());
        session.submit("boom now", &Services::default());
        assert_eq!(
            session.entries()[0].response,
            "Error executing 'boom': command error: kaput"
        );
    }

    #[test]
    fn login_failure_records_single_error_entry_and_no_token() {
        let (_clock, api) = memory_api();
        let services = Services {
            auth: Some(&api),
            ..Services::default()
        };
        let mut session = new_session();
        session.submit("login wrongpass", &services);
        assert_eq!(session.entries().len(), 1);
        assert_eq!(session.entries()[0].response, "Error: Invalid password");
        assert!(session.token().is_none());
        assert_eq!(session.identity().name, "visitor");
    }

    #[test]
    fn login_success_elevates_identity() {
        let (_clock, api) = memory_api();
        let services = Services {
            auth: Some(&api),
            ..Services::default()
        };
        let mut session = new_session();
        session.submit("login redpill", &services);
        assert!(session.token().is_some());
        assert_eq!(session.identity().name, "neo");
        assert!(session.identity().elevated);
        assert_eq!(session.prompt(), "neo@neosite:~");
    }

    #[test]
    fn history_builtin_lists_submitted_lines() {
        let mut session = new_session();
        session.submit("pwd", &Services::default());
        session.submit("history", &Services::default());
        let response = &session.entries()[1].response;
        assert!(response.contains("1  pwd"));
        assert!(response.contains("2  history"));
    }

    #[test]
    fn help_builtin_lists_commands() {
        let mut session = new_session();
        session.submit("help", &Services::default());
        let response = &session.entries()[0].response;
        assert!(response.contains("ls"));
        assert!(response.contains("login"));
        assert!(response.contains("Type 'help <command>'"));
    }

    #[test]
    fn entry_ids_are_unique_and_increasing() {
        let mut session = new_session();
        session.submit("pwd", &Services::default());
        session.submit("pwd", &Services::default());
        let ids: Vec<u64> = session.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn ping_parks_takeover_and_hides_prompt() {
        let (_clock, api) = memory_api();
        let services = Services {
            probe: Some(&api),
            ..Services::default()
        };
        let mut session = new_session();
        session.submit("ping -c 2 api.example.com", &services);
        assert!(!session.prompt_visible());
        let takeover = session.take_takeover();
        assert!(matches!(takeover, Some(Takeover::Ping(_))));
        session.finish_takeover();
        assert!(session.prompt_visible());
    }

    #[test]
    fn two_rapid_pings_are_independent() {
        let (_clock, api) = memory_api();
        let services = Services {
            probe: Some(&api),
            ..Services::default()
        };
        let mut session = new_session();
        session.submit("ping api.example.com", &services);
        assert!(!session.prompt_visible());
        let Some(Takeover::Ping(mut first)) = session.take_takeover() else {
            panic!("expected ping takeover");
        };
        session.submit("ping api.example.com", &services);
        let Some(Takeover::Ping(mut second)) = session.take_takeover() else {
            panic!("expected ping takeover");
        };
        first.tick(&api).unwrap();
        second.tick(&api).unwrap();
        // Cancelling the first restores the prompt and emits ^C.
        let line = first.interrupt();
        session.append_output(&line);
        session.finish_takeover();
        assert!(session.prompt_visible());
        assert!(session.entries().iter().any(|e| e.response == "^C"));
        // The second ping continues unaffected.
        assert!(!second.is_finished());
        assert!(second.tick(&api).is_some());
    }

    #[test]
    fn editor_save_through_session() {
        let (_clock, api) = memory_api();
        let services = Services {
            notes: Some(&api),
            ..Services::default()
        };
        let mut session = new_session();
        session.submit("nano visitors_notes/wake-up.txt", &services);
        let Some(Takeover::Editor(mut editor)) = session.take_takeover() else {
            panic!("expected editor takeover");
        };
        editor.set_buffer("follow the white rabbit");
        session.save_editor(&editor, &services);
        session.finish_takeover();
        assert_eq!(
            api.fetch("wake-up.txt").unwrap().content,
            "follow the white rabbit"
        );
        assert!(session.entries().iter().any(|e| e.response.contains("wake-up.txt")));
    }
}

//! Visitor-note commands: nano, rm, grep.

use neosite_types::error::{Result, SiteError};
use neosite_vfs::{remove_file, resolve_segments};

use crate::interpreter::{
    Command, CommandOutput, CommandRegistry, Environment, render_service_error, require_session,
};
use crate::takeover::{EditorSession, Takeover};

// ---------------------------------------------------------------------------
// nano
// ---------------------------------------------------------------------------

struct NanoCmd;
impl Command for NanoCmd {
    fn name(&self) -> &str {
        "nano"
    }
    fn description(&self) -> &str {
        "Open the full-screen editor"
    }
    fn usage(&self) -> &str {
        "nano [filename]"
    }
    fn category(&self) -> &str {
        "notes"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let editor = match args.first() {
            None => EditorSession::new(env.cwd.to_vec(), None, String::new()),
            Some(&path) => {
                let segments = resolve_segments(env.cwd, path);
                let Some((name, dir)) = segments.split_last() else {
                    return Ok(CommandOutput::Text(format!("nano: {path}: Is a directory")));
                };
                let under_notes = dir.iter().any(|s| s == "visitors_notes");
                let initial = if under_notes {
                    match env.notes {
                        Some(notes) => match notes.fetch(name) {
                            Ok(note) => note.content,
                            Err(SiteError::NotFound(_)) => String::new(),
                            Err(e) => {
                                return Ok(CommandOutput::Text(format!("Error: {e}")));
                            },
                        },
                        None => {
                            return Ok(CommandOutput::Text(
                                "nano: notes service unavailable".to_string(),
                            ));
                        },
                    }
                } else {
                    match env.tree.node_at(&segments) {
                        Some(node) if node.is_dir() => {
                            return Ok(CommandOutput::Text(format!(
                                "nano: {path}: Is a directory"
                            )));
                        },
                        Some(node) => node
                            .file_data()
                            .map(|d| d.content.clone())
                            .unwrap_or_default(),
                        None => String::new(),
                    }
                };
                EditorSession::new(dir.to_vec(), Some(name.clone()), initial)
            },
        };
        *env.prompt_visible = false;
        Ok(CommandOutput::Takeover(Takeover::Editor(editor)))
    }
}

// ---------------------------------------------------------------------------
// rm
// ---------------------------------------------------------------------------

struct RmCmd;
impl Command for RmCmd {
    fn name(&self) -> &str {
        "rm"
    }
    fn description(&self) -> &str {
        "Delete a visitor note (owner only)"
    }
    fn usage(&self) -> &str {
        "rm <file>"
    }
    fn category(&self) -> &str {
        "notes"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&target) = args.first() else {
            return Ok(CommandOutput::Text("usage: rm <file>".to_string()));
        };
        let token = match require_session(env, "rm") {
            Ok(token) => token,
            Err(denied) => return Ok(CommandOutput::Text(denied)),
        };

        let segments = resolve_segments(env.cwd, target);
        let under_notes = segments
            .iter()
            .position(|s| s == "visitors_notes")
            .is_some_and(|pos| pos < segments.len() - 1);
        let Some((name, dir)) = segments.split_last().filter(|_| under_notes) else {
            return Ok(CommandOutput::Text(format!(
                "rm: {target}: only files under visitors_notes can be removed"
            )));
        };

        let Some(notes) = env.notes else {
            return Ok(CommandOutput::Text("rm: notes service unavailable".to_string()));
        };
        match notes.delete(name, &token) {
            Ok(()) => {
                // Mirror the deletion into the local cached listing.
                if env.tree.node_at(&segments).is_some() {
                    *env.tree = remove_file(env.tree, dir, name)?;
                }
                Ok(CommandOutput::None)
            },
            Err(SiteError::NotFound(_)) => Ok(CommandOutput::Text(format!(
                "rm: {name}: No such file or directory"
            ))),
            Err(e) => Ok(CommandOutput::Text(render_service_error(env.token, "rm", e))),
        }
    }
}

// ---------------------------------------------------------------------------
// grep
// ---------------------------------------------------------------------------

struct GrepCmd;
impl Command for GrepCmd {
    fn name(&self) -> &str {
        "grep"
    }
    fn description(&self) -> &str {
        "Search visitor notes by filename substring"
    }
    fn usage(&self) -> &str {
        "grep <pattern>"
    }
    fn category(&self) -> &str {
        "notes"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&pattern) = args.first() else {
            return Ok(CommandOutput::Text("usage: grep <pattern>".to_string()));
        };
        let Some(notes) = env.notes else {
            return Ok(CommandOutput::Text(
                "grep: notes service unavailable".to_string(),
            ));
        };
        match notes.search(pattern) {
            Ok(matches) if matches.is_empty() => Ok(CommandOutput::None),
            Ok(matches) => Ok(CommandOutput::Text(matches.join("\n"))),
            Err(e) => Ok(CommandOutput::Text(format!("Error: {e}"))),
        }
    }
}

/// Register the visitor-note commands.
pub fn register_note_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(NanoCmd));
    reg.register(Box::new(RmCmd));
    reg.register(Box::new(GrepCmd));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Identity;
    use neosite_api::{AuthService, MemoryApi, NotesStore};
    use neosite_platform::{Clock, ManualClock, MemoryKv};
    use neosite_vfs::{FileData, FileTree};
    use std::rc::Rc;

    fn segs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    struct Ctx {
        tree: FileTree,
        identity: Identity,
        token: Option<String>,
        prompt_visible: bool,
        cwd: Vec<String>,
    }

    fn ctx() -> Ctx {
        let mut tree = FileTree::new();
        tree.mkdir("/home/neo/visitors_notes").unwrap();
        tree.seed(
            "/home/neo/visitors_notes/old.txt",
            FileData::text("cached"),
        )
        .unwrap();
        Ctx {
            tree,
            identity: Identity::visitor(),
            token: None,
            prompt_visible: true,
            cwd: segs(&["home", "neo"]),
        }
    }

    fn memory_api() -> MemoryApi {
        let clock = Rc::new(ManualClock::new(0));
        let kv = Rc::new(MemoryKv::new(Rc::clone(&clock) as Rc<dyn Clock>));
        let api = MemoryApi::new("redpill", clock, kv);
        api.seed_note("old.txt", "remote content", "trinity");
        api
    }

    fn exec(ctx: &mut Ctx, api: &MemoryApi, cmd: &dyn Command, args: &[&str]) -> CommandOutput {
        let mut env = Environment {
            cwd: &ctx.cwd,
            tree: &mut ctx.tree,
            identity: &mut ctx.identity,
            token: &mut ctx.token,
            prompt_visible: &mut ctx.prompt_visible,
            clock: None,
            settings: None,
            notes: Some(api),
            auth: Some(api),
            inbox: None,
            admin: None,
            weather: None,
            probe: None,
        };
        cmd.execute(args, &mut env).unwrap()
    }

    fn text(output: CommandOutput) -> String {
        match output {
            CommandOutput::Text(s) => s,
            other => panic!("expected text output, got {other:?}"),
        }
    }

    fn login(ctx: &mut Ctx, api: &MemoryApi) {
        ctx.token = Some(api.login("redpill").unwrap());
        ctx.identity = Identity::owner();
    }

    #[test]
    fn rm_requires_elevation() {
        let api = memory_api();
        let mut ctx = ctx();
        let out = text(exec(&mut ctx, &api, &RmCmd, &["visitors_notes/old.txt"]));
        assert!(out.contains("permission denied"));
        assert!(out.contains("login <password>"));
    }

    #[test]
    fn rm_restricted_to_visitors_notes() {
        let api = memory_api();
        let mut ctx = ctx();
        login(&mut ctx, &api);
        let out = text(exec(&mut ctx, &api, &RmCmd, &["/etc/passwd"]));
        assert!(out.contains("only files under visitors_notes"));
    }

    #[test]
    fn rm_deletes_remotely_and_mirrors_locally() {
        let api = memory_api();
        let mut ctx = ctx();
        login(&mut ctx, &api);
        let out = exec(&mut ctx, &api, &RmCmd, &["visitors_notes/old.txt"]);
        assert!(matches!(out, CommandOutput::None));
        assert!(api.fetch("old.txt").is_err());
        assert!(
            ctx.tree
                .node_at(&segs(&["home", "neo", "visitors_notes", "old.txt"]))
                .is_none()
        );
    }

    #[test]
    fn rm_missing_note() {
        let api = memory_api();
        let mut ctx = ctx();
        login(&mut ctx, &api);
        let out = text(exec(&mut ctx, &api, &RmCmd, &["visitors_notes/ghost.txt"]));
        assert_eq!(out, "rm: ghost.txt: No such file or directory");
    }

    #[test]
    fn rm_expired_session_clears_token() {
        let api = memory_api();
        let mut ctx = ctx();
        login(&mut ctx, &api);
        api.expire_sessions();
        let out = text(exec(&mut ctx, &api, &RmCmd, &["visitors_notes/old.txt"]));
        assert_eq!(out, "rm: permission denied, session expired");
        assert!(ctx.token.is_none());
    }

    #[test]
    fn nano_opens_empty_buffer_without_filename() {
        let api = memory_api();
        let mut ctx = ctx();
        let out = exec(&mut ctx, &api, &NanoCmd, &[]);
        match out {
            CommandOutput::Takeover(Takeover::Editor(editor)) => {
                assert!(editor.filename().is_none());
                assert_eq!(editor.buffer(), "");
            },
            other => panic!("expected editor takeover, got {other:?}"),
        }
        assert!(!ctx.prompt_visible);
    }

    #[test]
    fn nano_preloads_remote_note_content() {
        let api = memory_api();
        let mut ctx = ctx();
        let out = exec(&mut ctx, &api, &NanoCmd, &["visitors_notes/old.txt"]);
        match out {
            CommandOutput::Takeover(Takeover::Editor(editor)) => {
                assert_eq!(editor.buffer(), "remote content");
                assert_eq!(editor.filename(), Some("old.txt"));
            },
            other => panic!("expected editor takeover, got {other:?}"),
        }
    }

    #[test]
    fn nano_missing_remote_note_starts_empty() {
        let api = memory_api();
        let mut ctx = ctx();
        let out = exec(&mut ctx, &api, &NanoCmd, &["visitors_notes/fresh.txt"]);
        match out {
            CommandOutput::Takeover(Takeover::Editor(editor)) => {
                assert_eq!(editor.buffer(), "");
            },
            other => panic!("expected editor takeover, got {other:?}"),
        }
    }

    #[test]
    fn nano_on_directory_is_error_text() {
        let api = memory_api();
        let mut ctx = ctx();
        ctx.tree.mkdir("/home/neo/projects").unwrap();
        let out = text(exec(&mut ctx, &api, &NanoCmd, &["projects"]));
        assert!(out.contains("Is a directory"));
    }

    #[test]
    fn grep_matches_filenames() {
        let api = memory_api();
        api.seed_note("older.md", "x", "visitor");
        let mut ctx = ctx();
        let out = text(exec(&mut ctx, &api, &GrepCmd, &["old"]));
        assert!(out.contains("old.txt"));
        assert!(out.contains("older.md"));
    }

    #[test]
    fn grep_no_matches_is_silent() {
        let api = memory_api();
        let mut ctx = ctx();
        let out = exec(&mut ctx, &api, &GrepCmd, &["zzz"]);
        assert!(matches!(out, CommandOutput::None));
    }
}

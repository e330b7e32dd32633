//! Filesystem commands: ls, cat, pwd, echo, date, whoami.

use neosite_platform::format_timestamp;
use neosite_types::error::{Result, SiteError};
use neosite_vfs::{FsNode, resolve, resolve_segments};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, OWNER};

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn description(&self) -> &str {
        "List directory contents"
    }
    fn usage(&self) -> &str {
        "ls [-a] [-l] [-h] [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut all = false;
        let mut long = false;
        let mut human = false;
        let mut path_arg = None;
        for arg in args {
            if let Some(flags) = arg.strip_prefix('-')
                && !flags.is_empty()
            {
                for flag in flags.chars() {
                    match flag {
                        'a' => all = true,
                        'l' => long = true,
                        'h' => human = true,
                        other => {
                            return Ok(CommandOutput::Text(format!(
                                "ls: invalid option -- '{other}'"
                            )));
                        },
                    }
                }
            } else {
                path_arg = Some(*arg);
            }
        }

        let target = path_arg.unwrap_or(".");
        let Some(node) = resolve(env.tree, env.cwd, target) else {
            return Ok(CommandOutput::Text(format!(
                "ls: cannot access '{target}': No such file or directory"
            )));
        };

        // Permissive like common shell tooling: listing a file prints it.
        let Some(children) = node.children() else {
            let content = node.file_data().map(|d| d.content.clone()).unwrap_or_default();
            return Ok(CommandOutput::Text(content));
        };
        let visible: Vec<(&String, &FsNode)> = children
            .iter()
            .filter(|(name, _)| all || !name.starts_with('.'))
            .collect();
        if visible.is_empty() {
            return Ok(CommandOutput::None);
        }

        if !long {
            let names: Vec<String> = visible
                .iter()
                .map(|(name, node)| {
                    if node.is_dir() {
                        format!("{name}/")
                    } else {
                        (*name).clone()
                    }
                })
                .collect();
            return Ok(CommandOutput::Text(names.join("  ")));
        }

        let mut lines = Vec::new();
        for (name, node) in &visible {
            let (perms, owner, size, date, suffix) = match node {
                FsNode::Directory(_) => ("drwxr-xr-x", OWNER.to_string(), 4096, "-".to_string(), "/"),
                FsNode::File(data) => (
                    "-rw-r--r--",
                    data.author.clone().unwrap_or_else(|| OWNER.to_string()),
                    data.size.unwrap_or(data.content.len() as u64),
                    data.modified.clone().unwrap_or_else(|| "-".to_string()),
                    "",
                ),
            };
            let size_str = if human {
                format_size(size)
            } else {
                size.to_string()
            };
            lines.push(format!(
                "{perms}  {owner:<8} {size_str:>8}  {date:<12} {name}{suffix}"
            ));
        }
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes}")
    } else if bytes < 1024 * 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{:.1}M", bytes as f64 / (1024.0 * 1024.0))
    }
}

// ---------------------------------------------------------------------------
// cat
// ---------------------------------------------------------------------------

struct CatCmd;
impl Command for CatCmd {
    fn name(&self) -> &str {
        "cat"
    }
    fn description(&self) -> &str {
        "Display file contents"
    }
    fn usage(&self) -> &str {
        "cat <file>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&target) = args.first() else {
            return Ok(CommandOutput::Text("usage: cat <file>".to_string()));
        };
        let segments = resolve_segments(env.cwd, target);

        // Anything under visitors_notes is fetched from the notes store,
        // not read from the virtual tree.
        if let Some(pos) = segments.iter().position(|s| s == "visitors_notes") {
            if pos == segments.len() - 1 {
                return Ok(CommandOutput::Text(format!("cat: {target}: Is a directory")));
            }
            let Some(filename) = segments.last() else {
                return Ok(CommandOutput::Text(format!(
                    "cat: {target}: No such file or directory"
                )));
            };
            let Some(notes) = env.notes else {
                return Ok(CommandOutput::Text(
                    "cat: notes service unavailable".to_string(),
                ));
            };
            return Ok(CommandOutput::Text(match notes.fetch(filename) {
                Ok(note) => note.content,
                Err(SiteError::NotFound(_)) => {
                    format!("cat: {filename}: No such file or directory")
                },
                Err(e) => format!("Error: {e}"),
            }));
        }

        match env.tree.node_at(&segments) {
            Some(FsNode::File(data)) => Ok(CommandOutput::Text(data.content.clone())),
            Some(FsNode::Directory(_)) => {
                Ok(CommandOutput::Text(format!("cat: {target}: Is a directory")))
            },
            None => Ok(CommandOutput::Text(format!(
                "cat: {target}: No such file or directory"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Command for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Print working directory"
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let path = if env.cwd.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", env.cwd.join("/"))
        };
        Ok(CommandOutput::Text(path))
    }
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

struct EchoCmd;
impl Command for EchoCmd {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Print arguments"
    }
    fn usage(&self) -> &str {
        "echo [text...]"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(args.join(" ")))
    }
}

// ---------------------------------------------------------------------------
// date
// ---------------------------------------------------------------------------

struct DateCmd;
impl Command for DateCmd {
    fn name(&self) -> &str {
        "date"
    }
    fn description(&self) -> &str {
        "Print the current date and time"
    }
    fn usage(&self) -> &str {
        "date"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        match env.clock {
            Some(clock) => Ok(CommandOutput::Text(format_timestamp(clock.epoch_secs()))),
            None => Ok(CommandOutput::Text("date: clock unavailable".to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// whoami
// ---------------------------------------------------------------------------

struct WhoamiCmd;
impl Command for WhoamiCmd {
    fn name(&self) -> &str {
        "whoami"
    }
    fn description(&self) -> &str {
        "Print the active user"
    }
    fn usage(&self) -> &str {
        "whoami"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.identity.name.clone()))
    }
}

/// Register the filesystem command set.
pub fn register_fs_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(LsCmd));
    reg.register(Box::new(CatCmd));
    reg.register(Box::new(PwdCmd));
    reg.register(Box::new(EchoCmd));
    reg.register(Box::new(DateCmd));
    reg.register(Box::new(WhoamiCmd));
}

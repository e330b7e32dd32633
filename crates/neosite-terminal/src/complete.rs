//! Prefix-based tab completion.
//!
//! Returns a completed input string, or the original unchanged when no
//! unambiguous completion exists. Repeated presses with no unique match
//! never alter the buffer.

use neosite_vfs::{FileTree, resolve};

use crate::interpreter::CommandRegistry;

/// Commands whose argument position completes against the current
/// directory's children.
const PATH_COMMANDS: [&str; 4] = ["cd", "cat", "ls", "nano"];

/// Complete `input` against command names or, for the path-taking commands,
/// against the current directory's immediate children.
pub fn complete(input: &str, registry: &CommandRegistry, tree: &FileTree, cwd: &[String]) -> String {
    if input.is_empty() {
        return String::new();
    }

    // Still typing the command name.
    if !input.contains(' ') {
        let matches = registry.completions(input);
        if matches.len() == 1 {
            return format!("{} ", matches[0]);
        }
        return input.to_string();
    }

    let command = input.split_whitespace().next().unwrap_or("");
    if !PATH_COMMANDS.contains(&command) {
        return input.to_string();
    }

    // Last whitespace-delimited token is the partial filename (empty after
    // a trailing space).
    let partial = input.rsplit(' ').next().unwrap_or("");
    let Some(children) = resolve(tree, cwd, ".").and_then(|node| node.children()) else {
        return input.to_string();
    };
    let matches: Vec<&String> = children
        .keys()
        .filter(|name| name.starts_with(partial))
        .collect();
    if matches.len() != 1 {
        return input.to_string();
    }
    format!("{}{}", &input[..input.len() - partial.len()], matches[0])
}

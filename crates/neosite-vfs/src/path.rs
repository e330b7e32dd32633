//! Path expression normalization and lookup.
//!
//! Accepts absolute paths (`/a/b`), relative paths (`a/b`), home-relative
//! paths (`~`, `~/a`), and `.`/`..` segments. Reduction is permissive: `..`
//! at the root is a no-op, never an error.

use std::borrow::Cow;

use crate::tree::{FileTree, FsNode};

/// Segments of the simulated home directory, `/home/neo`.
pub const HOME_SEGMENTS: [&str; 2] = ["home", "neo"];

/// Substitute a leading `~` with the home directory.
fn expand_home(raw: &str) -> Cow<'_, str> {
    if raw == "~" {
        return Cow::Owned(format!("/{}", HOME_SEGMENTS.join("/")));
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return Cow::Owned(format!("/{}/{rest}", HOME_SEGMENTS.join("/")));
    }
    Cow::Borrowed(raw)
}

/// Resolve a path expression to absolute segments without touching the tree.
///
/// Used by `cd` to commit a new working directory only after the target is
/// confirmed to be a directory. Empty segments (repeated or trailing
/// slashes) are dropped, `.` is dropped, and `..` pops the accumulated tail.
pub fn resolve_segments(cwd: &[String], raw: &str) -> Vec<String> {
    let expanded = expand_home(raw);
    let (mut segments, remainder) = if let Some(rest) = expanded.strip_prefix('/') {
        (Vec::new(), rest)
    } else {
        (cwd.to_vec(), expanded.as_ref())
    };
    for component in remainder.split('/') {
        match component {
            "" | "." => {},
            ".." => {
                // Popping past the root is a documented no-op.
                segments.pop();
            },
            other => segments.push(other.to_string()),
        }
    }
    segments
}

/// Resolve a path expression to the node it designates, or `None`.
///
/// Absolute paths ignore `cwd`; `.` designates the current directory node
/// itself. No side effects.
pub fn resolve<'t>(tree: &'t FileTree, cwd: &[String], raw: &str) -> Option<&'t FsNode> {
    let segments = resolve_segments(cwd, raw);
    tree.node_at(&segments)
}

/// Render a segment stack for the prompt: `~` for home-relative paths,
/// absolute otherwise.
pub fn display_path(cwd: &[String]) -> String {
    if cwd.len() >= HOME_SEGMENTS.len()
        && cwd
            .iter()
            .zip(HOME_SEGMENTS.iter())
            .all(|(a, b)| a == b)
    {
        let rest = &cwd[HOME_SEGMENTS.len()..];
        if rest.is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.join("/"));
    }
    if cwd.is_empty() {
        return "/".to_string();
    }
    format!("/{}", cwd.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FileData;

    fn segs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn sample_tree() -> FileTree {
        let mut tree = FileTree::new();
        tree.mkdir("/home/neo/projects").unwrap();
        tree.mkdir("/home/neo/visitors_notes").unwrap();
        tree.mkdir("/etc").unwrap();
        tree.seed("/home/neo/about.txt", FileData::text("about me"))
            .unwrap();
        tree.seed("/etc/motd", FileData::text("wake up")).unwrap();
        tree
    }

    #[test]
    fn tilde_alone_is_home() {
        assert_eq!(resolve_segments(&[], "~"), segs(&["home", "neo"]));
    }

    #[test]
    fn tilde_slash_prefix_is_home_relative() {
        assert_eq!(
            resolve_segments(&segs(&["etc"]), "~/projects"),
            segs(&["home", "neo", "projects"])
        );
    }

    #[test]
    fn absolute_ignores_cwd() {
        let a = resolve_segments(&segs(&["etc"]), "/home/neo");
        let b = resolve_segments(&segs(&["home", "neo", "projects"]), "/home/neo");
        assert_eq!(a, b);
    }

    #[test]
    fn relative_prepends_cwd() {
        assert_eq!(
            resolve_segments(&segs(&["home", "neo"]), "projects"),
            segs(&["home", "neo", "projects"])
        );
    }

    #[test]
    fn dot_is_dropped() {
        assert_eq!(
            resolve_segments(&segs(&["home", "neo"]), "."),
            segs(&["home", "neo"])
        );
    }

    #[test]
    fn dotdot_pops() {
        assert_eq!(
            resolve_segments(&segs(&["home", "neo"]), ".."),
            segs(&["home"])
        );
    }

    #[test]
    fn dotdot_past_root_is_noop() {
        assert_eq!(resolve_segments(&[], "../../.."), Vec::<String>::new());
        assert_eq!(
            resolve_segments(&segs(&["etc"]), "../../../../etc"),
            segs(&["etc"])
        );
    }

    #[test]
    fn repeated_and_trailing_slashes_are_dropped() {
        assert_eq!(
            resolve_segments(&[], "/home//neo/"),
            resolve_segments(&[], "/home/neo")
        );
        assert_eq!(
            resolve_segments(&[], "//home///neo//projects///"),
            segs(&["home", "neo", "projects"])
        );
    }

    #[test]
    fn resolve_dot_returns_current_directory_node() {
        let tree = sample_tree();
        let cwd = segs(&["home", "neo"]);
        let via_dot = resolve(&tree, &cwd, ".").unwrap();
        let direct = tree.node_at(&cwd).unwrap();
        assert!(std::ptr::eq(via_dot, direct));
    }

    #[test]
    fn resolve_finds_file() {
        let tree = sample_tree();
        let node = resolve(&tree, &segs(&["home", "neo"]), "about.txt").unwrap();
        assert_eq!(node.file_data().unwrap().content, "about me");
    }

    #[test]
    fn resolve_through_file_fails() {
        let tree = sample_tree();
        assert!(resolve(&tree, &[], "/etc/motd/deeper").is_none());
    }

    #[test]
    fn resolve_missing_fails() {
        let tree = sample_tree();
        assert!(resolve(&tree, &segs(&["home", "neo"]), "nonexistent").is_none());
    }

    #[test]
    fn resolve_root() {
        let tree = sample_tree();
        assert!(resolve(&tree, &segs(&["etc"]), "/").unwrap().is_dir());
    }

    #[test]
    fn display_path_home_forms() {
        assert_eq!(display_path(&segs(&["home", "neo"])), "~");
        assert_eq!(
            display_path(&segs(&["home", "neo", "projects"])),
            "~/projects"
        );
        assert_eq!(display_path(&segs(&["etc"])), "/etc");
        assert_eq!(display_path(&[]), "/");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn absolute_resolution_ignores_cwd(
                cwd in proptest::collection::vec("[a-z]{1,6}", 0..4),
                path in "(/[a-z]{1,6}){1,4}",
            ) {
                let cwd: Vec<String> = cwd;
                let with_cwd = resolve_segments(&cwd, &path);
                let without = resolve_segments(&[], &path);
                prop_assert_eq!(with_cwd, without);
            }

            #[test]
            fn dotdot_never_panics(
                cwd in proptest::collection::vec("[a-z]{1,6}", 0..4),
                ups in 1usize..12,
            ) {
                let cwd: Vec<String> = cwd;
                let path = vec![".."; ups].join("/");
                let reduced = resolve_segments(&cwd, &path);
                prop_assert!(reduced.len() <= cwd.len());
            }

            #[test]
            fn reduction_never_keeps_dot_segments(
                path in "[a-z./]{0,30}",
            ) {
                for seg in resolve_segments(&[], &path) {
                    prop_assert!(seg != "." && seg != ".." && !seg.is_empty());
                }
            }

            #[test]
            fn trailing_slash_is_identity(
                path in "(/[a-z]{1,6}){1,4}",
            ) {
                let plain = resolve_segments(&[], &path);
                let trailing = resolve_segments(&[], &format!("{path}/"));
                prop_assert_eq!(plain, trailing);
            }
        }
    }
}

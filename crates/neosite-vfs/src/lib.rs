//! Virtual file system for the neosite terminal.
//!
//! The whole tree lives in memory as a strict tree of [`FsNode`] values: a
//! parent directory exclusively owns its children, there are no cross-links
//! and no cycles. The tree is built once at startup and afterwards mutated
//! only by copy-on-write: [`write_file`] and [`remove_file`] clone the tree
//! and return a new root, so anything still holding the previous snapshot is
//! unaffected.

mod path;
mod tree;

pub use path::{HOME_SEGMENTS, display_path, resolve, resolve_segments};
pub use tree::{FileData, FileTree, FsNode, directory_contents, remove_file, write_file};

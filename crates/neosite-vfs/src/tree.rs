//! The virtual file tree and its copy-on-write mutation primitives.

use std::collections::BTreeMap;

use neosite_types::error::{Result, SiteError};

/// A single node in the virtual tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FsNode {
    /// A regular file with text content and optional display metadata.
    File(FileData),
    /// A directory owning its children by name.
    Directory(BTreeMap<String, FsNode>),
}

/// Payload of a file node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileData {
    /// Text content. Mirrored remote notes may leave this empty.
    pub content: String,
    /// Byte count shown by `ls -l`; derived from content when created locally.
    pub size: Option<u64>,
    /// Preformatted modification date shown by `ls -l`.
    pub modified: Option<String>,
    /// Display owner shown by `ls -l`.
    pub author: Option<String>,
}

impl FileData {
    /// File data for locally written text: size derived, no metadata.
    pub fn text(content: &str) -> Self {
        Self {
            content: content.to_string(),
            size: Some(content.len() as u64),
            modified: None,
            author: None,
        }
    }
}

impl FsNode {
    /// A file node carrying `content`.
    pub fn file(content: &str) -> Self {
        FsNode::File(FileData::text(content))
    }

    /// An empty directory node.
    pub fn dir() -> Self {
        FsNode::Directory(BTreeMap::new())
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, FsNode::Directory(_))
    }

    /// The child map of a directory node.
    pub fn children(&self) -> Option<&BTreeMap<String, FsNode>> {
        match self {
            FsNode::Directory(children) => Some(children),
            FsNode::File(_) => None,
        }
    }

    /// File payload, if this is a file node.
    pub fn file_data(&self) -> Option<&FileData> {
        match self {
            FsNode::File(data) => Some(data),
            FsNode::Directory(_) => None,
        }
    }
}

/// The filesystem root: a synthetic directory node for `/`.
///
/// Constructed once at shell startup from the seeded layout, then replaced
/// wholesale by the mutation primitives. Never aliased: every mutation
/// returns a fresh tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTree {
    root: FsNode,
}

impl FileTree {
    /// An empty tree containing only the root directory.
    pub fn new() -> Self {
        Self {
            root: FsNode::dir(),
        }
    }

    /// The synthetic root directory node.
    pub fn root(&self) -> &FsNode {
        &self.root
    }

    /// Descend from the root through `segments` without any normalization.
    ///
    /// An empty segment list designates the root itself. Returns `None` if
    /// an interior node is not a directory or a name is absent.
    pub fn node_at(&self, segments: &[String]) -> Option<&FsNode> {
        let mut node = &self.root;
        for seg in segments {
            node = node.children()?.get(seg)?;
        }
        Some(node)
    }

    fn children_at_mut(&mut self, segments: &[String]) -> Option<&mut BTreeMap<String, FsNode>> {
        let mut node = &mut self.root;
        for seg in segments {
            match node {
                FsNode::Directory(children) => node = children.get_mut(seg)?,
                FsNode::File(_) => return None,
            }
        }
        match node {
            FsNode::Directory(children) => Some(children),
            FsNode::File(_) => None,
        }
    }

    // -- Startup seeding (in-place; used before the first snapshot is shared) --

    /// Create a directory and any missing parents.
    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        let segments = crate::path::resolve_segments(&[], path);
        let mut node = &mut self.root;
        for seg in &segments {
            match node {
                FsNode::Directory(children) => {
                    node = children.entry(seg.clone()).or_insert_with(FsNode::dir);
                },
                FsNode::File(_) => {
                    return Err(SiteError::Vfs(format!("not a directory: {path}")));
                },
            }
        }
        if !node.is_dir() {
            return Err(SiteError::Vfs(format!("not a directory: {path}")));
        }
        Ok(())
    }

    /// Insert a file at an absolute path. The parent directory must exist.
    pub fn seed(&mut self, path: &str, data: FileData) -> Result<()> {
        let segments = crate::path::resolve_segments(&[], path);
        let Some((name, dir)) = segments.split_last() else {
            return Err(SiteError::Vfs("cannot seed the root".to_string()));
        };
        let children = self
            .children_at_mut(dir)
            .ok_or_else(|| SiteError::Vfs(format!("parent directory does not exist: {path}")))?;
        children.insert(name.clone(), FsNode::File(data));
        Ok(())
    }
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Child names of a directory node. Empty for files and empty directories.
pub fn directory_contents(node: &FsNode) -> Vec<&str> {
    match node.children() {
        Some(children) => children.keys().map(String::as_str).collect(),
        None => Vec::new(),
    }
}

/// Copy-on-write file write.
///
/// Clones the entire tree, descends `cwd` by straight-line descent (no `.`
/// or `..` handling; callers pass an already-reduced segment stack), and
/// inserts or overwrites `children[name]` with a new file node. The input
/// tree is never mutated.
///
/// An invalid mid-traversal target is an error rather than a silent no-op.
pub fn write_file(tree: &FileTree, cwd: &[String], name: &str, data: FileData) -> Result<FileTree> {
    let mut next = tree.clone();
    let children = next
        .children_at_mut(cwd)
        .ok_or_else(|| SiteError::Vfs(format!("not a directory: /{}", cwd.join("/"))))?;
    children.insert(name.to_string(), FsNode::File(data));
    Ok(next)
}

/// Copy-on-write file removal.
///
/// Exists so `rm` can mirror a remote note deletion into the local cached
/// listing; the tree has no broader delete surface.
pub fn remove_file(tree: &FileTree, dir: &[String], name: &str) -> Result<FileTree> {
    let mut next = tree.clone();
    let children = next
        .children_at_mut(dir)
        .ok_or_else(|| SiteError::Vfs(format!("not a directory: /{}", dir.join("/"))))?;
    if children.remove(name).is_none() {
        return Err(SiteError::Vfs(format!("no such file: {name}")));
    }
    Ok(next)
}

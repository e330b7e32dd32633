//! Seed the virtual file tree with the site's home directory layout.

use neosite_api::NotesStore;
use neosite_vfs::{FileData, FileTree};

/// Build the startup tree: `/home/neo` with the seeded files and the
/// `visitors_notes` placeholder directory.
pub fn seed_tree() -> FileTree {
    let mut tree = FileTree::new();
    // In-place seeding is fine here; the first snapshot has not been
    // shared yet.
    tree.mkdir("/home/neo/projects").expect("seed layout");
    tree.mkdir("/home/neo/visitors_notes").expect("seed layout");
    tree.mkdir("/etc").expect("seed layout");

    let files: [(&str, &str); 6] = [
        (
            "/home/neo/about.txt",
            "Hi, I'm neo.\n\nI build things for the web and for terminals.\n\
             This site is one of them. Poke around: ls, cat, cd.\n",
        ),
        (
            "/home/neo/contact.txt",
            "email: neo@neosite.dev\n\nOr leave a note: nano visitors_notes/<yourname>.txt\n",
        ),
        (
            "/home/neo/.plan",
            "follow the white rabbit\n",
        ),
        (
            "/home/neo/projects/neosite.md",
            "# neosite\n\nThis very site. Terminal-themed, keyboard-first.\n",
        ),
        (
            "/home/neo/projects/perlin-bg.md",
            "# perlin-bg\n\nThe animated noise background. Tune it via `admin`.\n",
        ),
        (
            "/etc/motd",
            "Wake up...\nType 'help' to see what this shell can do.\n",
        ),
    ];
    for (path, content) in files {
        tree.seed(path, FileData::text(content)).expect("seed layout");
    }
    tree
}

/// Mirror the remote notes listing into `visitors_notes` so `ls` and tab
/// completion see the delivered notes. Content stays remote; only the
/// listing metadata is cached.
pub fn sync_visitor_notes(tree: &mut FileTree, notes: &dyn NotesStore) {
    let infos = match notes.list() {
        Ok(infos) => infos,
        Err(e) => {
            log::warn!("could not sync visitor notes: {e}");
            return;
        },
    };
    let count = infos.len();
    for info in infos {
        let data = FileData {
            content: String::new(),
            size: info.size,
            modified: info.updated_at,
            author: info.author,
        };
        if let Err(e) = tree.seed(&format!("/home/neo/visitors_notes/{}", info.filename), data) {
            log::warn!("could not mirror note {}: {e}", info.filename);
        }
    }
    log::info!("mirrored {count} visitor notes");
}

//! Full-screen takeover tasks: editor, ping, process monitor.
//!
//! Interactive sub-programs are explicit tasks with cancellation tokens.
//! The hosting UI drives them (tick/frame/key) and restores the prompt when
//! a task finishes; the shell session itself stays idle underneath.

use std::cell::Cell;
use std::rc::Rc;

use neosite_api::{LatencyProbe, Note, NotesStore};
use neosite_platform::{Clock, format_date};
use neosite_types::error::{Result, SiteError};
use neosite_vfs::{FileData, FileTree, write_file};

/// Shared cancellation flag. Each task owns one; clones observe the same
/// flag, so the host can cancel from outside the task.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.get()
    }
}

/// A parked takeover request, handed from the dispatcher to the host.
#[derive(Debug)]
pub enum Takeover {
    Editor(EditorSession),
    Ping(PingTask),
    Monitor(MonitorTask),
}

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

/// Auto-repeating latency probe, one tick per rendered line.
#[derive(Debug)]
pub struct PingTask {
    host: String,
    count: Option<u32>,
    sent: u32,
    token: CancelToken,
}

impl PingTask {
    pub fn new(host: &str, count: Option<u32>) -> Self {
        Self {
            host: host.to_string(),
            count,
            sent: 0,
            token: CancelToken::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The `-c` probe count, if one was given.
    pub fn count(&self) -> Option<u32> {
        self.count
    }

    /// The task's cancellation token; clones cancel this task only.
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn is_finished(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        match self.count {
            Some(c) => self.sent >= c,
            None => false,
        }
    }

    /// Perform one probe. Returns the rendered line, or `None` once the
    /// task is cancelled or its count is exhausted.
    pub fn tick(&mut self, probe: &dyn LatencyProbe) -> Option<String> {
        if self.is_finished() {
            return None;
        }
        self.sent += 1;
        match probe.probe(&self.host) {
            Ok(ms) => Some(format!(
                "64 bytes from {}: icmp_seq={} time={} ms",
                self.host, self.sent, ms
            )),
            Err(e) => {
                log::debug!("probe failed for {}: {e}", self.host);
                Some(format!("Request timeout for icmp_seq {}", self.sent))
            },
        }
    }

    /// User interrupt (Ctrl+C): cancels this task and yields the `^C` line.
    pub fn interrupt(&mut self) -> String {
        self.token.cancel();
        "^C".to_string()
    }

    /// Closing summary line.
    pub fn summary(&self) -> String {
        format!("--- {} ping statistics ---\n{} packets transmitted", self.host, self.sent)
    }
}

// ---------------------------------------------------------------------------
// htop
// ---------------------------------------------------------------------------

const PROCESSES: [(u32, &str, &str); 7] = [
    (1, "root", "init"),
    (42, "neo", "shelld"),
    (77, "neo", "perlin-bg"),
    (113, "neo", "scrollback"),
    (128, "www", "notesd"),
    (201, "www", "weatherd"),
    (314, "neo", "gallery"),
];

/// Simulated, self-animating process monitor. Exits on `q` or Ctrl+C.
#[derive(Debug)]
pub struct MonitorTask {
    frame_no: u64,
    done: bool,
}

impl MonitorTask {
    pub fn new() -> Self {
        Self {
            frame_no: 0,
            done: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.done
    }

    /// Render the next frame of the process table.
    pub fn frame(&mut self) -> String {
        self.frame_no += 1;
        let mut lines = vec![format!("{:>5} {:<8} {:>5} {:>5}  COMMAND", "PID", "USER", "CPU%", "MEM%")];
        for (pid, user, command) in &PROCESSES {
            // Deterministic pseudo-animation keyed on frame and pid.
            let mix = self
                .frame_no
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(*pid as u64);
            let cpu = (mix >> 33) % 300;
            let mem = (mix >> 13) % 120;
            lines.push(format!(
                "{pid:>5} {user:<8} {:>4}.{} {:>4}.{}  {command}",
                cpu / 10,
                cpu % 10,
                mem / 10,
                mem % 10
            ));
        }
        lines.push("\nq: quit".to_string());
        lines.join("\n")
    }

    /// Handle a key press. Returns `true` once the task has finished.
    pub fn key(&mut self, key: char) -> bool {
        if key == 'q' {
            self.done = true;
        }
        self.done
    }

    /// User interrupt (Ctrl+C).
    pub fn interrupt(&mut self) {
        self.done = true;
    }
}

impl Default for MonitorTask {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// nano
// ---------------------------------------------------------------------------

/// Full-screen modal editor state.
///
/// Saving a target under `visitors_notes` goes through the notes store
/// (POST to create, PUT to update, decided by a GET probe); anything else
/// is written into the virtual tree copy-on-write.
#[derive(Debug)]
pub struct EditorSession {
    dir: Vec<String>,
    filename: Option<String>,
    buffer: String,
}

impl EditorSession {
    /// Open a buffer rooted at `dir` (an already-reduced segment stack).
    pub fn new(dir: Vec<String>, filename: Option<String>, initial: String) -> Self {
        Self {
            dir,
            filename,
            buffer: initial,
        }
    }

    pub fn dir(&self) -> &[String] {
        &self.dir
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, name: &str) {
        self.filename = Some(name.to_string());
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn set_buffer(&mut self, text: &str) {
        self.buffer = text.to_string();
    }

    fn is_note_target(&self) -> bool {
        self.dir.iter().any(|s| s == "visitors_notes")
    }

    /// Commit the buffer and return the status line.
    pub fn save(
        &self,
        tree: &mut FileTree,
        notes: Option<&dyn NotesStore>,
        clock: Option<&dyn Clock>,
    ) -> Result<String> {
        let Some(name) = self.filename.as_deref() else {
            return Err(SiteError::Command("nano: no file name".to_string()));
        };

        let modified = clock.map(|c| format_date(c.epoch_secs()));
        if self.is_note_target() {
            let notes = notes
                .ok_or_else(|| SiteError::Api("notes service unavailable".to_string()))?;
            let note = Note {
                filename: name.to_string(),
                content: self.buffer.clone(),
            };
            // Probe existence to pick create vs update.
            let created = match notes.fetch(name) {
                Ok(_) => {
                    notes.update(&note)?;
                    false
                },
                Err(SiteError::NotFound(_)) => {
                    notes.create(&note)?;
                    true
                },
                Err(e) => return Err(e),
            };
            // Mirror into the local cached listing.
            *tree = write_file(
                tree,
                &self.dir,
                name,
                FileData {
                    content: self.buffer.clone(),
                    size: Some(self.buffer.len() as u64),
                    modified,
                    author: Some("visitor".to_string()),
                },
            )?;
            return Ok(if created {
                format!("[ New File ] wrote {name}")
            } else {
                format!("wrote {name}")
            });
        }

        *tree = write_file(
            tree,
            &self.dir,
            name,
            FileData {
                content: self.buffer.clone(),
                size: Some(self.buffer.len() as u64),
                modified,
                author: None,
            },
        )?;
        Ok(format!("wrote {} bytes to {name}", self.buffer.len()))
    }
}

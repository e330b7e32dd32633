//! Service traits the shell commands are written against.
//!
//! Every call maps to exactly one network request; there is no retry
//! policy. Failures come back as `SiteError` values that the commands
//! convert to rendered text: `NotFound` for a 404, `Unauthorized` for a 401
//! (the caller clears its stored session token), `RateLimited` for a 429.

use neosite_types::error::Result;

use crate::types::{AdminConfig, InboxMessage, Note, NoteInfo, WeatherReport};

/// The visitor-notes store.
pub trait NotesStore {
    /// List every note.
    fn list(&self) -> Result<Vec<NoteInfo>>;

    /// Fetch one note by filename.
    fn fetch(&self, filename: &str) -> Result<Note>;

    /// Create a new note. Open to visitors (the API layer rate-limits it).
    fn create(&self, note: &Note) -> Result<()>;

    /// Replace the content of an existing note.
    fn update(&self, note: &Note) -> Result<()>;

    /// Delete a note. Owner-only: requires a bearer token.
    fn delete(&self, filename: &str, token: &str) -> Result<()>;

    /// Filename-substring search over the notes list.
    fn search(&self, pattern: &str) -> Result<Vec<String>>;
}

/// Password authentication issuing bearer tokens.
pub trait AuthService {
    /// Exchange the owner password for a session token.
    fn login(&self, password: &str) -> Result<String>;
}

/// The owner's contact-message inbox. All calls are bearer-gated.
pub trait InboxService {
    /// List messages, optionally filtered to a period (`today`, `week`,
    /// `month`).
    fn messages(&self, period: Option<&str>, token: &str) -> Result<Vec<InboxMessage>>;

    /// Delete one message by id.
    fn delete(&self, id: u64, token: &str) -> Result<()>;
}

/// Site configuration endpoint. All calls are bearer-gated.
pub trait AdminApi {
    /// Current configuration.
    fn config(&self, token: &str) -> Result<AdminConfig>;

    /// Flip one mode toggle and return the updated configuration.
    fn set_mode(&self, mode: &str, enabled: bool, token: &str) -> Result<AdminConfig>;
}

/// Unauthenticated weather passthrough.
pub trait WeatherService {
    /// Current conditions, for `location` or the site default.
    fn current(&self, location: Option<&str>) -> Result<WeatherReport>;
}

/// Single latency measurement against a host, in milliseconds.
pub trait LatencyProbe {
    fn probe(&self, host: &str) -> Result<u32>;
}

//! In-memory simulation of the site's API handlers.
//!
//! Backs tests and the offline app mode. Mirrors the serverless handlers'
//! observable behavior: bearer-token checks, 404/401 error messages, and
//! the fixed-window rate limiting the real API layer applies to login
//! attempts and note creation.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use neosite_platform::{Clock, KvStore, format_date};
use neosite_ratelimit::check_rate_limit;
use neosite_types::error::{Result, SiteError};

use crate::contract::{
    AdminApi, AuthService, InboxService, LatencyProbe, NotesStore, WeatherService,
};
use crate::types::{AdminConfig, InboxMessage, Note, NoteInfo, WeatherReport};

/// Per-endpoint rate limit tuning, mirroring the real handlers.
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub login_limit: u32,
    pub login_window_secs: u64,
    pub note_limit: u32,
    pub note_window_secs: u64,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            login_limit: 5,
            login_window_secs: 300,
            note_limit: 3,
            note_window_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredNote {
    content: String,
    author: String,
    updated_at: String,
}

struct StoredMessage {
    created_epoch: u64,
    message: InboxMessage,
}

/// One object implementing every service trait, like [`crate::HttpApi`].
pub struct MemoryApi {
    password: String,
    clock: Rc<dyn Clock>,
    kv: Rc<dyn KvStore>,
    limits: RateLimits,
    tokens: RefCell<HashSet<String>>,
    token_seq: Cell<u64>,
    notes: RefCell<BTreeMap<String, StoredNote>>,
    inbox: RefCell<Vec<StoredMessage>>,
    config: RefCell<AdminConfig>,
    probe_seq: Cell<u32>,
}

impl MemoryApi {
    pub fn new(password: &str, clock: Rc<dyn Clock>, kv: Rc<dyn KvStore>) -> Self {
        Self {
            password: password.to_string(),
            clock,
            kv,
            limits: RateLimits::default(),
            tokens: RefCell::new(HashSet::new()),
            token_seq: Cell::new(0),
            notes: RefCell::new(BTreeMap::new()),
            inbox: RefCell::new(Vec::new()),
            config: RefCell::new(AdminConfig::default()),
            probe_seq: Cell::new(0),
        }
    }

    pub fn with_limits(mut self, limits: RateLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Seed a note, bypassing rate limits (fixture setup).
    pub fn seed_note(&self, filename: &str, content: &str, author: &str) {
        self.notes.borrow_mut().insert(
            filename.to_string(),
            StoredNote {
                content: content.to_string(),
                author: author.to_string(),
                updated_at: format_date(self.clock.epoch_secs()),
            },
        );
    }

    /// Seed an inbox message `age_secs` in the past (fixture setup).
    pub fn seed_message(&self, name: &str, email: Option<&str>, message: &str, age_secs: u64) {
        let created_epoch = self.clock.epoch_secs().saturating_sub(age_secs);
        let mut inbox = self.inbox.borrow_mut();
        let id = inbox.len() as u64 + 1;
        inbox.push(StoredMessage {
            created_epoch,
            message: InboxMessage {
                id,
                name: name.to_string(),
                email: email.map(str::to_string),
                message: message.to_string(),
                created_at: format_date(created_epoch),
            },
        });
    }

    fn check_token(&self, token: &str) -> Result<()> {
        if self.tokens.borrow().contains(token) {
            Ok(())
        } else {
            Err(SiteError::Unauthorized("session expired".to_string()))
        }
    }

    /// Invalidate every issued token (simulates server-side expiry).
    pub fn expire_sessions(&self) {
        self.tokens.borrow_mut().clear();
    }
}

impl NotesStore for MemoryApi {
    fn list(&self) -> Result<Vec<NoteInfo>> {
        Ok(self
            .notes
            .borrow()
            .iter()
            .map(|(filename, note)| NoteInfo {
                filename: filename.clone(),
                size: Some(note.content.len() as u64),
                updated_at: Some(note.updated_at.clone()),
                author: Some(note.author.clone()),
            })
            .collect())
    }

    fn fetch(&self, filename: &str) -> Result<Note> {
        match self.notes.borrow().get(filename) {
            Some(note) => Ok(Note {
                filename: filename.to_string(),
                content: note.content.clone(),
            }),
            None => Err(SiteError::NotFound("No such file or directory".to_string())),
        }
    }

    fn create(&self, note: &Note) -> Result<()> {
        if !check_rate_limit(
            Some(self.kv.as_ref()),
            self.clock.as_ref(),
            "notes:create",
            self.limits.note_limit,
            self.limits.note_window_secs,
        ) {
            return Err(SiteError::RateLimited(
                "Too many notes, slow down".to_string(),
            ));
        }
        self.notes.borrow_mut().insert(
            note.filename.clone(),
            StoredNote {
                content: note.content.clone(),
                author: "visitor".to_string(),
                updated_at: format_date(self.clock.epoch_secs()),
            },
        );
        Ok(())
    }

    fn update(&self, note: &Note) -> Result<()> {
        let mut notes = self.notes.borrow_mut();
        match notes.get_mut(&note.filename) {
            Some(stored) => {
                stored.content = note.content.clone();
                stored.updated_at = format_date(self.clock.epoch_secs());
                Ok(())
            },
            None => Err(SiteError::NotFound("No such file or directory".to_string())),
        }
    }

    fn delete(&self, filename: &str, token: &str) -> Result<()> {
        self.check_token(token)?;
        if self.notes.borrow_mut().remove(filename).is_none() {
            return Err(SiteError::NotFound("No such file or directory".to_string()));
        }
        Ok(())
    }

    fn search(&self, pattern: &str) -> Result<Vec<String>> {
        Ok(self
            .notes
            .borrow()
            .keys()
            .filter(|name| name.contains(pattern))
            .cloned()
            .collect())
    }
}

impl AuthService for MemoryApi {
    fn login(&self, password: &str) -> Result<String> {
        if !check_rate_limit(
            Some(self.kv.as_ref()),
            self.clock.as_ref(),
            "auth:login",
            self.limits.login_limit,
            self.limits.login_window_secs,
        ) {
            return Err(SiteError::RateLimited(
                "Too many login attempts, try again later".to_string(),
            ));
        }
        if password != self.password {
            return Err(SiteError::Unauthorized("Invalid password".to_string()));
        }
        let seq = self.token_seq.get() + 1;
        self.token_seq.set(seq);
        let token = format!("sess-{seq:08x}");
        self.tokens.borrow_mut().insert(token.clone());
        log::info!("issued session token #{seq}");
        Ok(token)
    }
}

impl InboxService for MemoryApi {
    fn messages(&self, period: Option<&str>, token: &str) -> Result<Vec<InboxMessage>> {
        self.check_token(token)?;
        let cutoff = match period {
            Some("today") => Some(86_400),
            Some("week") => Some(7 * 86_400),
            Some("month") => Some(30 * 86_400),
            Some(other) => {
                return Err(SiteError::Api(format!("unknown period: {other}")));
            },
            None => None,
        };
        let now = self.clock.epoch_secs();
        Ok(self
            .inbox
            .borrow()
            .iter()
            .filter(|m| match cutoff {
                Some(span) => m.created_epoch + span >= now,
                None => true,
            })
            .map(|m| m.message.clone())
            .collect())
    }

    fn delete(&self, id: u64, token: &str) -> Result<()> {
        self.check_token(token)?;
        let mut inbox = self.inbox.borrow_mut();
        let before = inbox.len();
        inbox.retain(|m| m.message.id != id);
        if inbox.len() == before {
            return Err(SiteError::NotFound(format!("no message with id {id}")));
        }
        Ok(())
    }
}

impl AdminApi for MemoryApi {
    fn config(&self, token: &str) -> Result<AdminConfig> {
        self.check_token(token)?;
        Ok(self.config.borrow().clone())
    }

    fn set_mode(&self, mode: &str, enabled: bool, token: &str) -> Result<AdminConfig> {
        self.check_token(token)?;
        let mut config = self.config.borrow_mut();
        match mode {
            "maintenance" => config.maintenance = enabled,
            "alerts" => config.alerts = enabled,
            other => return Err(SiteError::Api(format!("unknown mode: {other}"))),
        }
        Ok(config.clone())
    }
}

const CONDITIONS: [&str; 4] = ["clear", "partly cloudy", "overcast", "rain"];

impl WeatherService for MemoryApi {
    fn current(&self, location: Option<&str>) -> Result<WeatherReport> {
        let location = location.unwrap_or("Rotterdam");
        let hash = location
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
        Ok(WeatherReport {
            location: location.to_string(),
            temperature_c: 8.0 + (hash % 18) as f32,
            condition: CONDITIONS[(hash / 7 % 4) as usize].to_string(),
        })
    }
}

impl LatencyProbe for MemoryApi {
    fn probe(&self, host: &str) -> Result<u32> {
        let seq = self.probe_seq.get().wrapping_add(1);
        self.probe_seq.set(seq);
        let hash = host
            .bytes()
            .fold(7u32, |acc, b| acc.wrapping_mul(131).wrapping_add(b as u32));
        let base = 18 + hash % 60;
        let jitter = (hash.wrapping_mul(seq)) % 9;
        Ok(base + jitter)
    }
}

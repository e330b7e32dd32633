//! Key-value store abstraction.
//!
//! The rate limiter stores its per-window counters here. The in-memory
//! implementation honors TTLs against an injected [`Clock`] so window
//! expiry is testable without waiting.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use neosite_types::error::Result;

use crate::clock::Clock;

/// A string key-value store with per-entry expiry.
pub trait KvStore {
    /// Read a value. Expired entries read as absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value that expires `ttl_secs` from now.
    fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: u64,
}

/// Fully in-memory store for tests and the offline app mode.
pub struct MemoryKv {
    clock: Rc<dyn Clock>,
    entries: RefCell<HashMap<String, Entry>>,
}

impl MemoryKv {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = self.clock.epoch_secs();
        self.entries
            .borrow()
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let now = self.clock.epoch_secs();
        let mut entries = self.entries.borrow_mut();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            },
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let expires_at = self.clock.epoch_secs().saturating_add(ttl_secs);
        self.entries.borrow_mut().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}

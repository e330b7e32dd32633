//! Platform services for the neosite terminal core.
//!
//! Commands and the rate limiter talk to the outside world through the
//! traits here: a wall clock, a key-value store, and the observable
//! settings store. Each trait ships with an in-memory implementation used
//! by tests and by the offline mode of the app.

mod clock;
mod kv;
mod settings;

pub use clock::{Clock, ManualClock, SystemClock, format_date, format_timestamp};
pub use kv::{KvStore, MemoryKv};
pub use settings::{BackgroundTuning, Settings, SettingsStore};

//! External API collaborators for the neosite terminal.
//!
//! The shell never talks to the network directly; commands receive the
//! service traits here. [`HttpApi`] implements all of them against the
//! site's serverless endpoints, and [`MemoryApi`] simulates those handlers
//! in-process (including their rate limiting) for tests and offline runs.

mod contract;
mod http;
mod memory;
mod types;

pub use contract::{AdminApi, AuthService, InboxService, LatencyProbe, NotesStore, WeatherService};
pub use http::HttpApi;
pub use memory::{MemoryApi, RateLimits};
pub use types::{AdminConfig, InboxMessage, Note, NoteInfo, WeatherReport};

//! Shared types for the neosite terminal core.
//!
//! Every other crate in the workspace depends on this one for the common
//! error enum and result alias.

pub mod error;

pub use error::{Result, SiteError};

//! Error types for the neosite terminal core.

use std::io;

/// Errors produced by the neosite core.
///
/// The shell converts every one of these into a rendered scrollback line at
/// the dispatch boundary; there is no fatal class.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("VFS error: {0}")]
    Vfs(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("config error: {0}")]
    Config(String),

    /// A remote resource answered 404. Carries the server's message (or the
    /// missing name) so handlers can render it verbatim.
    #[error("{0}")]
    NotFound(String),

    /// A bearer-gated endpoint answered 401. Handlers clear the stored
    /// session token when they see this.
    #[error("{0}")]
    Unauthorized(String),

    /// The fixed-window limiter refused the request.
    #[error("{0}")]
    RateLimited(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vfs_error_display() {
        let e = SiteError::Vfs("no such file".into());
        assert_eq!(format!("{e}"), "VFS error: no such file");
    }

    #[test]
    fn command_error_display() {
        let e = SiteError::Command("unknown cmd".into());
        assert_eq!(format!("{e}"), "command error: unknown cmd");
    }

    #[test]
    fn api_error_display() {
        let e = SiteError::Api("bad gateway".into());
        assert_eq!(format!("{e}"), "API error: bad gateway");
    }

    #[test]
    fn not_found_carries_server_message() {
        let e = SiteError::NotFound("No such file or directory".into());
        assert_eq!(format!("{e}"), "No such file or directory");
    }

    #[test]
    fn unauthorized_carries_server_message() {
        let e = SiteError::Unauthorized("Invalid password".into());
        assert_eq!(format!("{e}"), "Invalid password");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: SiteError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let bad_toml = "this is [[[not valid toml";
        let toml_err = toml::from_str::<toml::Value>(bad_toml).unwrap_err();
        let e: SiteError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: SiteError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }

    #[test]
    fn result_alias_ok() {
        let r: Result<i32> = Ok(42);
        assert_eq!(r.unwrap(), 42);
    }

    #[test]
    fn result_alias_err() {
        let r: Result<i32> = Err(SiteError::Vfs("oops".into()));
        assert!(r.is_err());
    }
}

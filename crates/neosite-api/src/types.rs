//! Wire payloads exchanged with the site's API endpoints.

use serde::{Deserialize, Serialize};

/// Listing entry for a visitor note. Filename is the unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteInfo {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// A full visitor note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub filename: String,
    pub content: String,
}

/// A contact-form message in the owner's inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxMessage {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub message: String,
    pub created_at: String,
}

/// Site configuration toggles exposed to the `admin` and `alerts` commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Maintenance banner shown across the site.
    pub maintenance: bool,
    /// Whether new-message alert dispatches are enabled.
    pub alerts: bool,
}

/// Current conditions from the weather passthrough endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub temperature_c: f32,
    pub condition: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_info_roundtrip_with_optional_fields() {
        let json = r#"{"filename":"hello.txt"}"#;
        let info: NoteInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.filename, "hello.txt");
        assert!(info.size.is_none());
        assert!(info.author.is_none());
    }

    #[test]
    fn note_info_skips_absent_fields_on_serialize() {
        let info = NoteInfo {
            filename: "a.txt".into(),
            size: None,
            updated_at: None,
            author: None,
        };
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"filename":"a.txt"}"#);
    }

    #[test]
    fn inbox_message_deserializes() {
        let json = r#"{"id":7,"name":"trinity","message":"hi","created_at":"Aug  1 2026"}"#;
        let msg: InboxMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, 7);
        assert!(msg.email.is_none());
    }

    #[test]
    fn admin_config_defaults_off() {
        let cfg = AdminConfig::default();
        assert!(!cfg.maintenance);
        assert!(!cfg.alerts);
    }
}

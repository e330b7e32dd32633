//! HTTP-backed implementation of the service traits.
//!
//! One blocking request per call against the site's `/api` endpoints, with
//! bearer tokens attached where the contract requires them. Error bodies
//! are JSON `{"error": "..."}`; the message is surfaced verbatim so the
//! shell can render what the server said.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;

use neosite_types::error::{Result, SiteError};

use crate::contract::{
    AdminApi, AuthService, InboxService, LatencyProbe, NotesStore, WeatherService,
};
use crate::types::{AdminConfig, InboxMessage, Note, NoteInfo, WeatherReport};

/// Client for the site's serverless API.
pub struct HttpApi {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpApi {
    /// Build a client for `base_url` (e.g. `https://example.dev`).
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(timeout_secs))
                .build(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: &str, path: &str, token: Option<&str>) -> ureq::Request {
        let mut req = self.agent.request(method, &self.url(path));
        if let Some(token) = token {
            req = req.set("Authorization", &format!("Bearer {token}"));
        }
        req
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T> {
        let resp = self.request("GET", path, token).call().map_err(map_err)?;
        resp.into_json()
            .map_err(|e| SiteError::Api(format!("invalid response body: {e}")))
    }
}

/// Extract the server's error message from a non-2xx response.
fn body_message(resp: ureq::Response) -> String {
    let status_text = resp.status_text().to_string();
    let body = resp.into_string().unwrap_or_default();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body)
        && let Some(message) = value.get("error").and_then(|e| e.as_str())
    {
        return message.to_string();
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status_text
    } else {
        trimmed.to_string()
    }
}

fn map_err(err: ureq::Error) -> SiteError {
    match err {
        ureq::Error::Status(404, resp) => SiteError::NotFound(body_message(resp)),
        ureq::Error::Status(401, resp) => SiteError::Unauthorized(body_message(resp)),
        ureq::Error::Status(429, resp) => SiteError::RateLimited(body_message(resp)),
        ureq::Error::Status(code, resp) => {
            SiteError::Api(format!("{code} {}", body_message(resp)))
        },
        ureq::Error::Transport(t) => SiteError::Api(t.to_string()),
    }
}

/// Minimal query-string encoding for user-supplied values.
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            },
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

impl NotesStore for HttpApi {
    fn list(&self) -> Result<Vec<NoteInfo>> {
        self.get_json("/api/notes", None)
    }

    fn fetch(&self, filename: &str) -> Result<Note> {
        self.get_json(&format!("/api/notes/{}", encode_query(filename)), None)
    }

    fn create(&self, note: &Note) -> Result<()> {
        self.request("POST", "/api/notes", None)
            .send_json(json!({ "filename": note.filename, "content": note.content }))
            .map_err(map_err)?;
        Ok(())
    }

    fn update(&self, note: &Note) -> Result<()> {
        self.request(
            "PUT",
            &format!("/api/notes/{}", encode_query(&note.filename)),
            None,
        )
        .send_json(json!({ "content": note.content }))
        .map_err(map_err)?;
        Ok(())
    }

    fn delete(&self, filename: &str, token: &str) -> Result<()> {
        self.request(
            "DELETE",
            &format!("/api/notes/{}", encode_query(filename)),
            Some(token),
        )
        .call()
        .map_err(map_err)?;
        Ok(())
    }

    fn search(&self, pattern: &str) -> Result<Vec<String>> {
        let infos: Vec<NoteInfo> =
            self.get_json(&format!("/api/notes?q={}", encode_query(pattern)), None)?;
        Ok(infos.into_iter().map(|i| i.filename).collect())
    }
}

impl AuthService for HttpApi {
    fn login(&self, password: &str) -> Result<String> {
        let resp = self
            .request("POST", "/api/auth/login", None)
            .send_json(json!({ "password": password }))
            .map_err(map_err)?;
        let value: serde_json::Value = resp
            .into_json()
            .map_err(|e| SiteError::Api(format!("invalid response body: {e}")))?;
        value
            .get("token")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| SiteError::Auth("login response missing token".to_string()))
    }
}

impl InboxService for HttpApi {
    fn messages(&self, period: Option<&str>, token: &str) -> Result<Vec<InboxMessage>> {
        let path = match period {
            Some(p) => format!("/api/inbox?period={}", encode_query(p)),
            None => "/api/inbox".to_string(),
        };
        self.get_json(&path, Some(token))
    }

    fn delete(&self, id: u64, token: &str) -> Result<()> {
        self.request("DELETE", &format!("/api/inbox/{id}"), Some(token))
            .call()
            .map_err(map_err)?;
        Ok(())
    }
}

impl AdminApi for HttpApi {
    fn config(&self, token: &str) -> Result<AdminConfig> {
        self.get_json("/api/admin/config", Some(token))
    }

    fn set_mode(&self, mode: &str, enabled: bool, token: &str) -> Result<AdminConfig> {
        let resp = self
            .request("PUT", "/api/admin/config", Some(token))
            .send_json(json!({ "mode": mode, "enabled": enabled }))
            .map_err(map_err)?;
        resp.into_json()
            .map_err(|e| SiteError::Api(format!("invalid response body: {e}")))
    }
}

impl WeatherService for HttpApi {
    fn current(&self, location: Option<&str>) -> Result<WeatherReport> {
        let path = match location {
            Some(l) => format!("/api/weather?location={}", encode_query(l)),
            None => "/api/weather".to_string(),
        };
        self.get_json(&path, None)
    }
}

impl LatencyProbe for HttpApi {
    fn probe(&self, host: &str) -> Result<u32> {
        let value: serde_json::Value =
            self.get_json(&format!("/api/ping?host={}", encode_query(host)), None)?;
        value
            .get("latency_ms")
            .and_then(|v| v.as_u64())
            .map(|ms| ms as u32)
            .ok_or_else(|| SiteError::Api("ping response missing latency_ms".to_string()))
    }
}

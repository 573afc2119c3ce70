//! Types shared by the DirectAdmin client, parser and gateway

use serde::{Deserialize, Serialize};

/// Panel command that lists, creates and deletes forwarders
pub const FORWARDERS_COMMAND: &str = "CMD_API_EMAIL_FORWARDERS";

/// A mail alias redirecting to one or more addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forwarder {
    /// Local part only (no `@domain`)
    pub alias: String,
    /// Destination addresses, in panel order, never empty
    pub destinations: Vec<String>,
}

/// Outbound form-encoded call to the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRequest {
    /// Command path appended to the panel URL
    pub command: String,
    /// Form fields, sent in order
    pub fields: Vec<(String, String)>,
}

impl PanelRequest {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    /// Value of the first field named `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Raw panel reply, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelResponse {
    pub status: u16,
    pub body: String,
}

impl PanelResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_http_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

use serde::{Deserialize, Serialize};

use crate::server::ServerRecord;

/// Payload half of a [`ResponseEnvelope`]. `list` fills `servers`, `save` and
/// `ping` fill `server`, `delete` usually carries neither.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ResponseData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<ServerRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerRecord>,
}

/// Uniform wrapper returned by every server API call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: ResponseData,
}

impl ResponseEnvelope {
    pub fn servers(&self) -> &[ServerRecord] {
        self.data.servers.as_deref().unwrap_or(&[])
    }

    pub fn server(&self) -> Option<&ServerRecord> {
        self.data.server.as_ref()
    }

    /// Copy of this envelope's metadata carrying `servers` as its only payload.
    pub fn with_servers(&self, servers: Vec<ServerRecord>) -> Self {
        Self {
            timestamp: self.timestamp.clone(),
            status_code: self.status_code,
            status: self.status.clone(),
            message: self.message.clone(),
            data: ResponseData {
                servers: Some(servers),
                server: None,
            },
        }
    }

    pub fn with_message(&self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..self.clone()
        }
    }
}

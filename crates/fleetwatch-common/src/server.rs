use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ServerStatus {
    #[serde(rename = "SERVER_UP")]
    Up,
    #[default]
    #[serde(rename = "SERVER_DOWN")]
    Down,
}

impl ServerStatus {
    /// Wire name, as the API sends it.
    pub fn as_str(self) -> &'static str {
        match self {
            ServerStatus::Up => "SERVER_UP",
            ServerStatus::Down => "SERVER_DOWN",
        }
    }

    /// Human-facing label used in filter messages and tables.
    pub fn label(self) -> &'static str {
        match self {
            ServerStatus::Up => "SERVER UP",
            ServerStatus::Down => "SERVER DOWN",
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown server status '{0}', expected ALL, SERVER_UP or SERVER_DOWN")]
pub struct ParseStatusError(pub String);

impl FromStr for ServerStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SERVER_UP" | "UP" => Ok(ServerStatus::Up),
            "SERVER_DOWN" | "DOWN" => Ok(ServerStatus::Down),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Status selector for the local filter action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    All,
    Only(ServerStatus),
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("ALL"),
            StatusFilter::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    pub id: i64,
    pub ip_address: String,
    pub name: String,
    pub memory: String,
    #[serde(rename = "type")]
    pub server_type: String,
    pub status: ServerStatus,
}

/// Payload for `save`: a server the API has not assigned an id to yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServerDraft {
    pub ip_address: String,
    pub name: String,
    pub memory: String,
    #[serde(rename = "type")]
    pub server_type: String,
    #[serde(default)]
    pub status: ServerStatus,
}

impl ServerDraft {
    pub fn into_record(self, id: i64) -> ServerRecord {
        ServerRecord {
            id,
            ip_address: self.ip_address,
            name: self.name,
            memory: self.memory,
            server_type: self.server_type,
            status: self.status,
        }
    }
}

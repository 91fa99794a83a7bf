use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use fleetwatch_common::{ResponseData, ResponseEnvelope, ServerDraft, ServerRecord, ServerStatus};

use crate::error::TransportError;
use crate::types::ServerApi;

/// In-process stand-in for the server inventory API.
///
/// Records live in id order; `ping` answers from a reachability table
/// (unknown addresses stay in their current status). Failures can be queued
/// with [`MemoryServerApi::fail_next`] and are consumed one per call.
#[derive(Debug, Clone)]
pub struct MemoryServerApi {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    servers: BTreeMap<i64, ServerRecord>,
    reachable: HashMap<String, bool>,
    failures: VecDeque<u16>,
    latency: Duration,
}

impl MemoryServerApi {
    pub fn new() -> Self {
        Self::with_servers(Vec::new())
    }

    pub fn with_servers(servers: Vec<ServerRecord>) -> Self {
        let next_id = servers.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let inner = Inner {
            next_id,
            servers: servers.into_iter().map(|s| (s.id, s)).collect(),
            ..Default::default()
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// A small fleet for demo mode.
    pub fn sample() -> Self {
        let seed = [
            ("192.168.1.160", "Ubuntu Linux", "16 GB", "Personal PC", ServerStatus::Down),
            ("192.168.1.58", "Fedora Linux", "16 GB", "Dell Tower", ServerStatus::Down),
            ("192.168.1.21", "MS 2008", "32 GB", "Web Server", ServerStatus::Up),
            ("192.168.1.14", "Red Hat Enterprise Linux", "64 GB", "Mail Server", ServerStatus::Up),
        ];
        let servers = seed
            .into_iter()
            .enumerate()
            .map(|(i, (ip, name, memory, server_type, status))| ServerRecord {
                id: i as i64 + 1,
                ip_address: ip.to_string(),
                name: name.to_string(),
                memory: memory.to_string(),
                server_type: server_type.to_string(),
                status,
            })
            .collect();
        Self::with_servers(servers)
    }

    /// Queue a failure: the next call answers with HTTP `code`.
    pub async fn fail_next(&self, code: u16) {
        self.inner.write().await.failures.push_back(code);
    }

    pub async fn set_reachable(&self, ip_address: &str, reachable: bool) {
        self.inner
            .write()
            .await
            .reachable
            .insert(ip_address.to_string(), reachable);
    }

    /// Delay applied to every subsequent call before it answers.
    pub async fn set_latency(&self, latency: Duration) {
        self.inner.write().await.latency = latency;
    }

    pub async fn records(&self) -> Vec<ServerRecord> {
        self.inner.read().await.servers.values().cloned().collect()
    }

    async fn begin(&self) -> Result<(), TransportError> {
        let latency = self.inner.read().await.latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        match self.inner.write().await.failures.pop_front() {
            Some(code) => Err(TransportError::from_code(code)),
            None => Ok(()),
        }
    }
}

impl Default for MemoryServerApi {
    fn default() -> Self {
        Self::new()
    }
}

fn envelope(status_code: u16, message: impl Into<String>, data: ResponseData) -> ResponseEnvelope {
    ResponseEnvelope {
        timestamp: Some(chrono::Local::now().naive_local().to_string()),
        status_code,
        status: if status_code == 201 { "CREATED" } else { "OK" }.to_string(),
        message: message.into(),
        data,
    }
}

#[async_trait]
impl ServerApi for MemoryServerApi {
    async fn list(&self) -> Result<ResponseEnvelope, TransportError> {
        self.begin().await?;
        let inner = self.inner.read().await;
        Ok(envelope(
            200,
            "Servers retrieved",
            ResponseData {
                servers: Some(inner.servers.values().cloned().collect()),
                server: None,
            },
        ))
    }

    async fn save(&self, draft: &ServerDraft) -> Result<ResponseEnvelope, TransportError> {
        self.begin().await?;
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        let record = draft.clone().into_record(id);
        inner.servers.insert(id, record.clone());
        Ok(envelope(
            201,
            "Server created",
            ResponseData {
                servers: None,
                server: Some(record),
            },
        ))
    }

    async fn ping(&self, ip_address: &str) -> Result<ResponseEnvelope, TransportError> {
        self.begin().await?;
        let mut inner = self.inner.write().await;
        let reachable = inner.reachable.get(ip_address).copied();
        let Some(record) = inner
            .servers
            .values_mut()
            .find(|s| s.ip_address == ip_address)
        else {
            return Err(TransportError::from_code(404));
        };
        if let Some(up) = reachable {
            record.status = if up { ServerStatus::Up } else { ServerStatus::Down };
        }
        let message = match record.status {
            ServerStatus::Up => "Ping success",
            ServerStatus::Down => "Ping failed",
        };
        Ok(envelope(
            200,
            message,
            ResponseData {
                servers: None,
                server: Some(record.clone()),
            },
        ))
    }

    async fn delete(&self, id: i64) -> Result<ResponseEnvelope, TransportError> {
        self.begin().await?;
        let mut inner = self.inner.write().await;
        if inner.servers.remove(&id).is_none() {
            return Err(TransportError::from_code(404));
        }
        Ok(envelope(200, "Server deleted", ResponseData::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(ip: &str) -> ServerDraft {
        ServerDraft {
            ip_address: ip.to_string(),
            name: "new box".to_string(),
            memory: "8 GB".to_string(),
            server_type: "Build".to_string(),
            status: ServerStatus::Down,
        }
    }

    #[tokio::test]
    async fn test_save_assigns_next_id() {
        let api = MemoryServerApi::sample();
        let resp = api.save(&draft("10.1.1.1")).await.unwrap();
        assert_eq!(resp.status_code, 201);
        assert_eq!(resp.server().map(|s| s.id), Some(5));
        assert_eq!(api.list().await.unwrap().servers().len(), 5);
    }

    #[tokio::test]
    async fn test_ping_uses_reachability() {
        let api = MemoryServerApi::sample();
        api.set_reachable("192.168.1.160", true).await;
        let resp = api.ping("192.168.1.160").await.unwrap();
        assert_eq!(resp.message, "Ping success");
        assert_eq!(resp.server().map(|s| s.status), Some(ServerStatus::Up));

        let err = api.ping("10.9.9.9").await.unwrap_err();
        assert_eq!(err.code, 404);
    }

    #[tokio::test]
    async fn test_queued_failure_is_consumed_once() {
        let api = MemoryServerApi::sample();
        api.fail_next(500).await;
        assert_eq!(api.list().await.unwrap_err().code, 500);
        assert!(api.list().await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let api = MemoryServerApi::sample();
        assert_eq!(api.delete(42).await.unwrap_err().code, 404);
        assert!(api.delete(1).await.is_ok());
        assert_eq!(api.records().await.len(), 3);
    }
}

use fleetwatch_common::{ResponseEnvelope, ServerRecord};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("server {0} is not in the cached list")]
    NotFound(i64),
    #[error("response carried no server record")]
    MissingRecord,
}

/// Last known server list, kept as the envelope it arrived in.
///
/// Received envelopes are never edited; every patch stores a freshly built
/// envelope and returns a copy of it as the new snapshot.
#[derive(Debug, Clone, Default)]
pub struct LocalCache {
    envelope: Option<ResponseEnvelope>,
}

impl LocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.envelope.is_some()
    }

    pub fn snapshot(&self) -> Option<ResponseEnvelope> {
        self.envelope.clone()
    }

    pub fn servers(&self) -> &[ServerRecord] {
        self.envelope.as_ref().map(|e| e.servers()).unwrap_or(&[])
    }

    /// Full list: newest first, so the response order is reversed.
    pub fn apply_list(&mut self, resp: &ResponseEnvelope) -> ResponseEnvelope {
        let servers = resp.servers().iter().rev().cloned().collect();
        self.store(resp.with_servers(servers))
    }

    /// Swap in the pinged record at its current position.
    pub fn apply_ping(&mut self, resp: &ResponseEnvelope) -> Result<ResponseEnvelope, PatchError> {
        let pinged = resp.server().ok_or(PatchError::MissingRecord)?;
        let index = self
            .servers()
            .iter()
            .position(|srv| srv.id == pinged.id)
            .ok_or(PatchError::NotFound(pinged.id))?;

        let mut servers = self.servers().to_vec();
        servers[index] = pinged.clone();
        let base = self.envelope.clone().unwrap_or_default();
        Ok(self.store(base.with_servers(servers)))
    }

    pub fn apply_save(&mut self, resp: &ResponseEnvelope) -> Result<ResponseEnvelope, PatchError> {
        let saved = resp.server().ok_or(PatchError::MissingRecord)?;
        let servers = std::iter::once(saved.clone())
            .chain(self.servers().iter().cloned())
            .collect();
        Ok(self.store(resp.with_servers(servers)))
    }

    /// Drops `id` if present; an unknown id leaves the sequence as it was.
    pub fn apply_delete(&mut self, id: i64, resp: &ResponseEnvelope) -> ResponseEnvelope {
        let servers = self
            .servers()
            .iter()
            .filter(|srv| srv.id != id)
            .cloned()
            .collect();
        self.store(resp.with_servers(servers))
    }

    fn store(&mut self, envelope: ResponseEnvelope) -> ResponseEnvelope {
        self.envelope = Some(envelope.clone());
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetwatch_common::{ResponseData, ServerStatus};

    fn srv(id: i64, status: ServerStatus) -> ServerRecord {
        ServerRecord {
            id,
            ip_address: format!("192.168.1.{id}"),
            name: format!("host-{id}"),
            memory: "32 GB".to_string(),
            server_type: "Web Server".to_string(),
            status,
        }
    }

    fn list_of(servers: Vec<ServerRecord>) -> ResponseEnvelope {
        ResponseEnvelope {
            status_code: 200,
            message: "Servers retrieved".to_string(),
            data: ResponseData {
                servers: Some(servers),
                server: None,
            },
            ..Default::default()
        }
    }

    fn single(message: &str, server: Option<ServerRecord>) -> ResponseEnvelope {
        ResponseEnvelope {
            status_code: 200,
            message: message.to_string(),
            data: ResponseData {
                servers: None,
                server,
            },
            ..Default::default()
        }
    }

    fn ids(cache: &LocalCache) -> Vec<i64> {
        cache.servers().iter().map(|s| s.id).collect()
    }

    fn loaded(ids_in_response_order: &[i64]) -> LocalCache {
        let mut cache = LocalCache::new();
        cache.apply_list(&list_of(
            ids_in_response_order
                .iter()
                .map(|id| srv(*id, ServerStatus::Down))
                .collect(),
        ));
        cache
    }

    #[test]
    fn test_list_is_reversed() {
        let resp = list_of(vec![
            srv(1, ServerStatus::Up),
            srv(2, ServerStatus::Down),
            srv(3, ServerStatus::Up),
        ]);
        let mut cache = LocalCache::new();
        assert!(!cache.is_loaded());
        let snap = cache.apply_list(&resp);
        assert_eq!(ids(&cache), vec![3, 2, 1]);
        assert_eq!(snap.message, "Servers retrieved");
        // the received envelope keeps its own order
        assert_eq!(resp.servers()[0].id, 1);
    }

    #[test]
    fn test_ping_replaces_in_place() {
        // cached order is [a, b] = [2, 1]
        let mut cache = loaded(&[1, 2]);
        let before = cache.snapshot().unwrap();
        let snap = cache
            .apply_ping(&single("Ping success", Some(srv(2, ServerStatus::Up))))
            .unwrap();
        assert_eq!(ids(&cache), vec![2, 1]);
        assert_eq!(cache.servers()[0].status, ServerStatus::Up);
        assert_eq!(cache.servers()[1].status, ServerStatus::Down);
        assert_eq!(snap.message, "Servers retrieved");
        assert_eq!(before.servers()[0].status, ServerStatus::Down);
    }

    #[test]
    fn test_ping_unknown_id_is_guarded() {
        let mut cache = loaded(&[1, 2]);
        let before = cache.snapshot();
        let err = cache
            .apply_ping(&single("Ping success", Some(srv(9, ServerStatus::Up))))
            .unwrap_err();
        assert_eq!(err, PatchError::NotFound(9));
        assert_eq!(cache.snapshot(), before);

        let err = cache.apply_ping(&single("Ping success", None)).unwrap_err();
        assert_eq!(err, PatchError::MissingRecord);
    }

    #[test]
    fn test_save_prepends() {
        let mut cache = loaded(&[2, 1]);
        assert_eq!(ids(&cache), vec![1, 2]);
        let snap = cache
            .apply_save(&single("Server created", Some(srv(3, ServerStatus::Down))))
            .unwrap();
        assert_eq!(ids(&cache), vec![3, 1, 2]);
        assert_eq!(snap.message, "Server created");
        assert!(snap.server().is_none());
    }

    #[test]
    fn test_save_before_load_starts_list() {
        let mut cache = LocalCache::new();
        cache
            .apply_save(&single("Server created", Some(srv(1, ServerStatus::Up))))
            .unwrap();
        assert_eq!(ids(&cache), vec![1]);
    }

    #[test]
    fn test_delete_removes_by_id() {
        let mut cache = loaded(&[3, 2, 1]);
        assert_eq!(ids(&cache), vec![1, 2, 3]);
        let snap = cache.apply_delete(2, &single("Server deleted", None));
        assert_eq!(ids(&cache), vec![1, 3]);
        assert_eq!(snap.message, "Server deleted");
    }

    #[test]
    fn test_delete_unknown_id_keeps_sequence() {
        let mut cache = loaded(&[2, 1]);
        cache.apply_delete(77, &single("Server deleted", None));
        assert_eq!(ids(&cache), vec![1, 2]);
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};

use fleetwatch_common::{ResponseEnvelope, ServerDraft};

use crate::error::TransportError;
use crate::types::ServerApi;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/server";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Prefix of every route, e.g. `http://localhost:8080/server`.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// [`ServerApi`] over the REST endpoints `list`, `save`, `ping/{ip}` and
/// `delete/{id}`.
#[derive(Debug, Clone)]
pub struct HttpServerApi {
    http: Client,
    base_url: Url,
}

impl HttpServerApi {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .timeout(config.timeout)
            .build()?;
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            TransportError::invalid_request(format!("api url '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::invalid_request(format!(
                "api url '{base_url}' has no path"
            )));
        }
        Ok(Self { http, base_url })
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment.
    fn url(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                TransportError::invalid_request(format!("api url '{}' has no path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute(
        &self,
        op: &'static str,
        request: RequestBuilder,
    ) -> Result<ResponseEnvelope, TransportError> {
        let resp = request.send().await.map_err(|e| {
            tracing::warn!(op, error = %e, "request failed");
            TransportError::from(e)
        })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(op, status = status.as_u16(), "server api returned error status");
            return Err(TransportError::from_code(status.as_u16()));
        }

        let envelope: ResponseEnvelope = resp.json().await.map_err(|e| {
            tracing::warn!(op, error = %e, "undecodable response envelope");
            TransportError::from_code(status.as_u16())
        })?;
        tracing::debug!(op, ?envelope, "server api response");
        Ok(envelope)
    }
}

#[async_trait]
impl ServerApi for HttpServerApi {
    async fn list(&self) -> Result<ResponseEnvelope, TransportError> {
        let url = self.url(&["list"])?;
        self.execute("list", self.http.get(url)).await
    }

    async fn save(&self, draft: &ServerDraft) -> Result<ResponseEnvelope, TransportError> {
        let url = self.url(&["save"])?;
        self.execute("save", self.http.post(url).json(draft)).await
    }

    async fn ping(&self, ip_address: &str) -> Result<ResponseEnvelope, TransportError> {
        let url = self.url(&["ping", ip_address])?;
        self.execute("ping", self.http.get(url)).await
    }

    async fn delete(&self, id: i64) -> Result<ResponseEnvelope, TransportError> {
        let url = self.url(&["delete", &id.to_string()])?;
        self.execute("delete", self.http.delete(url)).await
    }
}

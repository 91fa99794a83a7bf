use async_trait::async_trait;

use fleetwatch_common::{ResponseEnvelope, ServerDraft, StatusFilter};

use crate::error::TransportError;
use crate::filter::filter_envelope;

/// Operations the dashboard issues against the server inventory API.
///
/// One attempt per call: implementations never retry.
#[async_trait]
pub trait ServerApi: Send + Sync {
    async fn list(&self) -> Result<ResponseEnvelope, TransportError>;
    async fn save(&self, draft: &ServerDraft) -> Result<ResponseEnvelope, TransportError>;
    async fn ping(&self, ip_address: &str) -> Result<ResponseEnvelope, TransportError>;
    async fn delete(&self, id: i64) -> Result<ResponseEnvelope, TransportError>;

    /// Local only: narrows an already received envelope, no request is made.
    fn filter(
        &self,
        status: StatusFilter,
        envelope: &ResponseEnvelope,
    ) -> Result<ResponseEnvelope, TransportError> {
        Ok(filter_envelope(status, envelope))
    }
}

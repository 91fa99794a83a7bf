pub mod envelope;
pub mod server;

pub use envelope::{ResponseData, ResponseEnvelope};
pub use server::{ParseStatusError, ServerDraft, ServerRecord, ServerStatus, StatusFilter};

pub mod telemetry;

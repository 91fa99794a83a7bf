pub mod error;
pub mod filter;
pub mod http;
pub mod memory;
pub mod types;

pub use error::TransportError;
pub use filter::filter_envelope;
pub use http::{ClientConfig, HttpServerApi};
pub use memory::MemoryServerApi;
pub use types::ServerApi;

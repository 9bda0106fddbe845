//! The inbound seam: fetching and decoding one resource.

use async_trait::async_trait;
use thiserror::Error;

use crate::event::ResourceSpecification;
use crate::to::TransferObject;

/// Errors the transport layer can surface for a single fetch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("payload could not be decoded: {0}")]
    Decode(String),
}

/// Fetches a resource and decodes it into a typed payload.
///
/// Implementations wrap the HTTP transport and the per-media-type codec,
/// both of which live outside this core. `Ok(None)` means the fetch
/// succeeded but yielded no usable transfer object; the aggregator treats
/// that as a logged no-op.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn fetch(
        &self,
        spec: &ResourceSpecification,
    ) -> Result<Option<TransferObject>, TransportError>;
}

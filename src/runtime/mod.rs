//! Session orchestration and lifecycle management.
//!
//! This module contains the infrastructure around the aggregation core:
//!
//! - **Session loop**: single owner of all aggregators and the event store
//! - **Fetch plumbing**: spawning transfers and routing their completions
//! - **Seams**: the [`Transport`] and mock collaborators for testing
//! - **Observability setup**: initializing tracing and logging
//!
//! # Main Components
//!
//! - [`Session`] - The event loop that owns the aggregation trees
//! - [`ResourceProxy`] - Cloneable handle for issuing fetches into the loop
//! - [`Transport`] - The seam wrapping HTTP transport and payload decoding
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod mock;
mod proxy;
mod session;
pub mod tracing;
mod transport;

pub use proxy::ResourceProxy;
pub use session::{Session, SessionError};
pub use tracing::setup_tracing;
pub use transport::{Transport, TransportError};

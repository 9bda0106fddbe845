#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Hyperbrowse
//!
//! > **An aggregation core for hypermedia-driven object browsing.**
//!
//! A hypermedia API describes domain objects, their collections, their
//! layouts, and their metadata as separate linked resources. This crate
//! reconciles those loosely-ordered resources into coherent view models:
//! each user gesture starts an aggregation tree that fans out follow-up
//! fetches, merges whatever arrives in whatever order, and opens the view
//! exactly once, when everything needed to render it is present.
//!
//! ## Core Concepts
//!
//! ### Aggregators: Convergence under Any Interleaving
//! An [`aggregator`](crate::aggregator) is a state machine fed one decoded
//! payload at a time. Responses arrive in network order, not logical order,
//! so every reconciliation step is written to be commutative where ordering
//! is not guaranteed. Readiness is re-checked after every step; the view
//! opens on the transition.
//!
//! ### The Session: One Loop, No Locks
//! All aggregators and the fetch log live inside a single [`runtime::Session`]
//! event loop, processing one message at a time. Concurrency exists only at
//! the fetch boundary: each transfer runs as its own Tokio task and sends
//! its completion back into the loop.
//!
//! ### Deduplication: At Most One Transfer per Resource
//! The [`event`](crate::event) store keys every fetch by its resource
//! specification. Re-requests join the in-flight transfer or are recorded
//! as duplicates and never delivered; an aggregator receiving a duplicate
//! treats it as a protocol violation.
//!
//! ## Module Tour
//!
//! - [`to`] - Transfer objects: the decoded resource payloads.
//! - [`event`] - Fetch lifecycle records and the deduplicating store.
//! - [`model`] - Display models that accumulate toward render-readiness.
//! - [`aggregator`] - The reconciliation state machines.
//! - [`view`] - The outbound seam views are opened through.
//! - [`runtime`] - The session loop, transport seam, and mocks.
//!
//! ## Running Tests
//!
//! ```bash
//! RUST_LOG=hyperbrowse=debug cargo test
//! ```

pub mod aggregator;
pub mod event;
pub mod model;
pub mod runtime;
pub mod to;
pub mod view;

pub use aggregator::{Aggregator, AggregatorError, AggregatorId};
pub use event::{EventState, LogEntry, ResourceSpecification, SubType};
pub use model::{CollectionDM, ObjectDM};
pub use runtime::{ResourceProxy, Session, SessionError, Transport, TransportError};
pub use view::ViewManager;

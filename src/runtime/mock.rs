//! # Mock Collaborators
//!
//! In-memory stand-ins for the transport and view seams, used by the
//! integration tests.
//!
//! Route resources onto a [`MockTransport`] with [`MockTransport::route`],
//! then drive a [`Session`](super::Session) against it and assert on the
//! [`RecordingViewManager`]'s openings and the transport's hit counts.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::transport::{Transport, TransportError};
use crate::event::ResourceSpecification;
use crate::model::{CollectionDM, ObjectDM};
use crate::to::TransferObject;
use crate::view::ViewManager;

enum RouteOutcome {
    Payload(TransferObject),
    Empty,
    Fail(TransportError),
}

/// A transport backed by a routing table from URL to canned outcome.
///
/// Unrouted URLs resolve to a 404-style status error rather than panicking,
/// so a test that forgets a route observes a stalled view instead of a
/// crash, the same failure shape the real system would show.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, RouteOutcome>>,
    hits: Mutex<HashMap<String, usize>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `url` to a decoded transfer object.
    pub fn route(&self, url: &str, payload: TransferObject) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), RouteOutcome::Payload(payload));
    }

    /// Routes `url` to a successful fetch that decodes to nothing.
    pub fn route_empty(&self, url: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), RouteOutcome::Empty);
    }

    /// Routes `url` to a transport failure.
    pub fn route_err(&self, url: &str, err: TransportError) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), RouteOutcome::Fail(err));
    }

    /// How many times `url` was fetched.
    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(
        &self,
        spec: &ResourceSpecification,
    ) -> Result<Option<TransferObject>, TransportError> {
        *self
            .hits
            .lock()
            .unwrap()
            .entry(spec.url.clone())
            .or_insert(0) += 1;
        // Let sibling fetch tasks interleave, as real network responses do.
        tokio::task::yield_now().await;

        let routes = self.routes.lock().unwrap();
        match routes.get(&spec.url) {
            Some(RouteOutcome::Payload(payload)) => Ok(Some(payload.clone())),
            Some(RouteOutcome::Empty) => Ok(None),
            Some(RouteOutcome::Fail(err)) => Err(err.clone()),
            None => Err(TransportError::Status {
                url: spec.url.clone(),
                status: 404,
            }),
        }
    }
}

/// What a recorded view opening looked like.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOpening {
    Collection { title: String, rows: usize },
    Object { title: String },
}

/// Records every view the session opens, in order.
#[derive(Default)]
pub struct RecordingViewManager {
    openings: Mutex<Vec<ViewOpening>>,
}

impl RecordingViewManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn openings(&self) -> Vec<ViewOpening> {
        self.openings.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.openings.lock().unwrap().len()
    }
}

impl ViewManager for RecordingViewManager {
    fn open_collection_view(&self, model: &CollectionDM) {
        self.openings.lock().unwrap().push(ViewOpening::Collection {
            title: model.effective_title(),
            rows: model.rows().len(),
        });
    }

    fn open_object_view(&self, model: &ObjectDM) {
        self.openings.lock().unwrap().push(ViewOpening::Object {
            title: model.effective_title(),
        });
    }
}

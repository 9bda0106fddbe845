//! The deduplication log behind `ResourceProxy`.

use std::collections::HashMap;

use super::log_entry::{EventState, ResourceSpecification};
use crate::aggregator::AggregatorId;

/// What a fetch request turned into once checked against the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDisposition {
    /// First request for this specification; a transfer must be started.
    Start,
    /// A transfer is already in flight; the caller was added as a
    /// subscriber and will receive the completion callback.
    Join,
    /// The resource was already fetched (or failed). The request is
    /// recorded as a duplicate and must not be dispatched.
    Duplicate,
}

struct FetchRecord {
    state: EventState,
    subscribers: Vec<AggregatorId>,
    /// Everyone who ever asked for this resource, kept beyond resolution
    /// so a reset can purge the records of one aggregation tree.
    requesters: Vec<AggregatorId>,
}

/// Tracks every fetch ever issued, keyed by [`ResourceSpecification`].
///
/// Guarantees at most one outstanding transfer per distinct specification.
/// No retry: a failed fetch stays failed and later requests for it are
/// treated as duplicates, until a reset purges the tree's records.
#[derive(Default)]
pub struct EventStore {
    records: HashMap<ResourceSpecification, FetchRecord>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest of `target` in `spec` and decides whether a new
    /// transfer has to be started.
    pub fn begin(&mut self, spec: &ResourceSpecification, target: AggregatorId) -> FetchDisposition {
        match self.records.get_mut(spec) {
            None => {
                self.records.insert(
                    spec.clone(),
                    FetchRecord {
                        state: EventState::Pending,
                        subscribers: vec![target],
                        requesters: vec![target],
                    },
                );
                FetchDisposition::Start
            }
            Some(record) if record.state == EventState::Pending => {
                record.subscribers.push(target);
                record.requesters.push(target);
                FetchDisposition::Join
            }
            Some(record) => {
                record.requesters.push(target);
                FetchDisposition::Duplicate
            }
        }
    }

    /// Marks the transfer as finished and drains everyone waiting on it.
    pub fn resolve(&mut self, spec: &ResourceSpecification, state: EventState) -> Vec<AggregatorId> {
        match self.records.get_mut(spec) {
            Some(record) => {
                record.state = state;
                std::mem::take(&mut record.subscribers)
            }
            None => Vec::new(),
        }
    }

    /// Forgets every record `target` ever requested, making those resources
    /// fetchable again. A record shared with another aggregator is dropped
    /// wholly; the other tree keeps its already-delivered data and a
    /// re-request from it simply starts a fresh transfer.
    pub fn purge(&mut self, target: AggregatorId) {
        self.records
            .retain(|_, record| !record.requesters.contains(&target));
    }

    pub fn state_of(&self, spec: &ResourceSpecification) -> Option<EventState> {
        self.records.get(spec).map(|r| r.state)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

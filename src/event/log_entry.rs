//! Fetch lifecycle records.

use crate::to::TransferObject;

/// Which decoding the resource is requested with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubType {
    Json,
    Xml,
}

/// Identifies a fetched resource: URL plus fetch parameters.
///
/// Immutable once created; used as the deduplication key. A blank URL is
/// the marker specification used for parent readiness notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceSpecification {
    pub url: String,
    pub sub_type: SubType,
}

impl ResourceSpecification {
    pub fn new(url: impl Into<String>, sub_type: SubType) -> Self {
        Self {
            url: url.into(),
            sub_type,
        }
    }

    /// The blank-URL marker used when a child notifies its parent.
    pub fn marker() -> Self {
        Self::new("", SubType::Json)
    }
}

/// Lifecycle state of one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Pending,
    Success,
    Duplicate,
    Error,
}

/// Records one fetch attempt: its specification, lifecycle state, and the
/// decoded payload once the response resolved.
///
/// Entries in [`EventState::Duplicate`] state must never be delivered to an
/// aggregator's reconciliation logic; that is a protocol violation the
/// aggregators guard against.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub specification: ResourceSpecification,
    pub state: EventState,
    pub payload: Option<TransferObject>,
    pub fault: Option<String>,
}

impl LogEntry {
    pub fn success(specification: ResourceSpecification, payload: Option<TransferObject>) -> Self {
        Self {
            specification,
            state: EventState::Success,
            payload,
            fault: None,
        }
    }

    pub fn failure(specification: ResourceSpecification, fault: impl Into<String>) -> Self {
        Self {
            specification,
            state: EventState::Error,
            payload: None,
            fault: Some(fault.into()),
        }
    }

    /// The empty entry a parent receives when a child asks it to re-evaluate
    /// overall readiness. Carries no payload on purpose.
    pub fn marker() -> Self {
        Self::success(ResourceSpecification::marker(), None)
    }

    pub fn url(&self) -> &str {
        &self.specification.url
    }

    pub fn transfer_object(&self) -> Option<&TransferObject> {
        self.payload.as_ref()
    }
}

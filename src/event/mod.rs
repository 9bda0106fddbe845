//! Fetch lifecycle plumbing: resource identification, log entries, and the
//! deduplication store.

mod log_entry;
mod store;

pub use log_entry::{EventState, LogEntry, ResourceSpecification, SubType};
pub use store::{EventStore, FetchDisposition};

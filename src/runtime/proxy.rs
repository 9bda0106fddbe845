//! The cloneable fetch handle handed to code outside the session loop.

use tokio::sync::mpsc;

use super::session::SessionMsg;
use crate::aggregator::AggregatorId;
use crate::event::SubType;
use crate::to::Link;

/// Requests fetches on behalf of an aggregator.
///
/// Holds only a sender into the session's event loop, so it is cheap to
/// clone and safe to use from any task. Deduplication happens inside the
/// session: at most one transfer per distinct resource specification, and
/// requests for already-fetched resources are recorded as duplicates and
/// never dispatched.
#[derive(Clone)]
pub struct ResourceProxy {
    tx: mpsc::UnboundedSender<SessionMsg>,
}

impl ResourceProxy {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SessionMsg>) -> Self {
        Self { tx }
    }

    /// Fetches `link` with the default JSON decoding, delivering the
    /// resulting log entry to `target`.
    pub fn fetch(&self, link: &Link, target: AggregatorId, referrer: &str) {
        self.fetch_as(link, target, referrer, SubType::Json);
    }

    pub fn fetch_as(&self, link: &Link, target: AggregatorId, referrer: &str, sub_type: SubType) {
        // A closed session means the view was torn down; nothing to deliver to.
        let _ = self.tx.send(SessionMsg::Fetch {
            link: link.clone(),
            target,
            referrer: referrer.to_string(),
            sub_type,
        });
    }
}

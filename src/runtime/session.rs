//! The single-threaded event loop that owns the aggregation trees.
//!
//! All aggregator and display-model state lives inside [`Session`] and is
//! mutated only while processing one message at a time, so no locking is
//! needed anywhere in the core. Concurrency exists purely at the fetch
//! boundary: every started transfer is a spawned task that sends its
//! completion back into the loop, and nothing orders independent
//! completions — the aggregators are written to converge under any
//! interleaving.

use std::collections::VecDeque;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::proxy::ResourceProxy;
use super::transport::{Transport, TransportError};
use crate::aggregator::{
    Aggregator, AggregatorContext, AggregatorError, AggregatorId, CollectionAggregator, Command,
    ObjectAggregator, Registry,
};
use crate::event::{EventState, EventStore, FetchDisposition, LogEntry, ResourceSpecification, SubType};
use crate::model::{CollectionDM, ObjectDM};
use crate::to::{Link, TransferObject};
use crate::view::ViewManager;

/// Errors that end a session run.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Aggregator(#[from] AggregatorError),

    #[error("no aggregator registered for {0}")]
    UnknownTarget(AggregatorId),
}

/// Messages processed by the session loop.
#[derive(Debug)]
pub(crate) enum SessionMsg {
    Fetch {
        link: Link,
        target: AggregatorId,
        referrer: String,
        sub_type: SubType,
    },
    Resolved {
        spec: ResourceSpecification,
        outcome: Result<Option<TransferObject>, TransportError>,
    },
}

/// Owns the event store, the aggregator registry, and the seams to the
/// transport and view layers.
pub struct Session {
    tx: mpsc::UnboundedSender<SessionMsg>,
    rx: mpsc::UnboundedReceiver<SessionMsg>,
    transport: Arc<dyn Transport>,
    views: Arc<dyn ViewManager>,
    registry: Registry,
    store: EventStore,
    next_id: u64,
    in_flight: usize,
}

impl Session {
    pub fn new(transport: Arc<dyn Transport>, views: Arc<dyn ViewManager>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            transport,
            views,
            registry: Registry::default(),
            store: EventStore::new(),
            next_id: 1,
            in_flight: 0,
        }
    }

    /// A handle for issuing fetches from outside the loop.
    pub fn proxy(&self) -> ResourceProxy {
        ResourceProxy::new(self.tx.clone())
    }

    /// Registers a root collection aggregator.
    pub fn root_collection(&mut self, title: &str) -> AggregatorId {
        let id = self.allocate();
        info!(%id, title, "root collection aggregator registered");
        self.registry
            .insert(id, Box::new(CollectionAggregator::new(id, title)));
        id
    }

    /// Registers a root object aggregator.
    pub fn root_object(&mut self, title: &str) -> AggregatorId {
        let id = self.allocate();
        info!(%id, title, "root object aggregator registered");
        self.registry
            .insert(id, Box::new(ObjectAggregator::new(id, title)));
        id
    }

    /// Clears an aggregator's accumulated state and forgets its fetch
    /// history, so the view can be rebuilt from scratch when the query is
    /// re-run. Child aggregators spawned for the previous run are dropped
    /// along with their fetch records; the re-run spawns fresh ones.
    pub fn reset(&mut self, id: AggregatorId) -> bool {
        let Some(aggregator) = self.registry.get_mut(id) else {
            return false;
        };
        let children = aggregator.children();
        aggregator.reset();
        self.store.purge(id);
        for child in children {
            info!(%id, %child, "dropping stale child aggregator");
            self.registry.remove(child);
            self.store.purge(child);
        }
        true
    }

    pub fn collection_model(&self, id: AggregatorId) -> Option<&CollectionDM> {
        self.registry.get(id)?.collection_model()
    }

    pub fn object_model(&self, id: AggregatorId) -> Option<&ObjectDM> {
        self.registry.get(id)?.object_model()
    }

    /// Processes messages until no transfer is in flight and the queue is
    /// drained.
    ///
    /// An incomplete model leaves the loop idle without ever opening its
    /// view: a silent stall rather than a crash, and there is deliberately
    /// no timeout layer here to detect it. Only the fatal taxonomy —
    /// protocol violations and unsupported payload shapes — ends the run
    /// with an error.
    pub async fn run_until_idle(&mut self) -> Result<(), SessionError> {
        loop {
            let msg = if self.in_flight == 0 {
                match self.rx.try_recv() {
                    Ok(msg) => msg,
                    Err(_) => break,
                }
            } else {
                match self.rx.recv().await {
                    Some(msg) => msg,
                    None => break,
                }
            };
            self.handle(msg)?;
        }
        Ok(())
    }

    fn allocate(&mut self) -> AggregatorId {
        let id = AggregatorId(self.next_id);
        self.next_id += 1;
        id
    }

    fn handle(&mut self, msg: SessionMsg) -> Result<(), SessionError> {
        match msg {
            SessionMsg::Fetch {
                link,
                target,
                referrer,
                sub_type,
            } => {
                self.begin_fetch(&link, target, &referrer, sub_type);
                Ok(())
            }
            SessionMsg::Resolved { spec, outcome } => self.finish_fetch(spec, outcome),
        }
    }

    fn begin_fetch(&mut self, link: &Link, target: AggregatorId, referrer: &str, sub_type: SubType) {
        let spec = ResourceSpecification::new(link.href.clone(), sub_type);
        match self.store.begin(&spec, target) {
            FetchDisposition::Start => {
                debug!(url = %spec.url, %target, referrer, "fetch started");
                self.in_flight += 1;
                let transport = Arc::clone(&self.transport);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = transport.fetch(&spec).await;
                    let _ = tx.send(SessionMsg::Resolved { spec, outcome });
                });
            }
            FetchDisposition::Join => {
                debug!(url = %spec.url, %target, "joined in-flight fetch");
            }
            FetchDisposition::Duplicate => {
                // Recorded in the store, never dispatched.
                debug!(url = %spec.url, %target, "duplicate fetch suppressed");
            }
        }
    }

    fn finish_fetch(
        &mut self,
        spec: ResourceSpecification,
        outcome: Result<Option<TransferObject>, TransportError>,
    ) -> Result<(), SessionError> {
        self.in_flight -= 1;
        let entry = match outcome {
            Ok(payload) => {
                debug!(url = %spec.url, kind = payload.as_ref().map(TransferObject::kind), "fetch resolved");
                LogEntry::success(spec.clone(), payload)
            }
            Err(err) => {
                warn!(url = %spec.url, error = %err, "fetch failed");
                LogEntry::failure(spec.clone(), err.to_string())
            }
        };
        let subscribers = self.store.resolve(&spec, entry.state);
        for target in subscribers {
            self.dispatch(target, entry.clone())?;
        }
        Ok(())
    }

    /// Delivers an entry to one aggregator and applies everything it
    /// emitted. Parent notifications are queued and processed here too, so
    /// readiness re-evaluation climbs the tree within a single dispatch.
    fn dispatch(&mut self, target: AggregatorId, entry: LogEntry) -> Result<(), SessionError> {
        let mut queue = VecDeque::new();
        queue.push_back((target, entry));

        while let Some((target, entry)) = queue.pop_front() {
            let Some(mut aggregator) = self.registry.remove(target) else {
                return Err(SessionError::UnknownTarget(target));
            };
            let mut ctx = AggregatorContext::new(&self.registry, &mut self.next_id);
            let result = aggregator.update(&entry, &mut ctx);
            let AggregatorContext {
                commands, spawned, ..
            } = ctx;
            self.registry.insert(target, aggregator);
            result?;

            for (id, child) in spawned {
                self.registry.insert(id, child);
            }
            for command in commands {
                match command {
                    Command::Fetch {
                        link,
                        target,
                        referrer,
                        sub_type,
                    } => self.begin_fetch(&link, target, &referrer, sub_type),
                    Command::NotifyParent { parent } => {
                        queue.push_back((parent, LogEntry::marker()));
                    }
                    Command::AdoptCollection {
                        parent,
                        collection_id,
                        child,
                    } => {
                        if let Some(p) = self.registry.get_mut(parent) {
                            p.adopt_collection(&collection_id, child);
                        }
                    }
                    Command::OpenCollectionView { target } => {
                        if let Some(model) =
                            self.registry.get(target).and_then(Aggregator::collection_model)
                        {
                            info!(%target, title = %model.effective_title(), "opening collection view");
                            self.views.open_collection_view(model);
                        }
                    }
                    Command::OpenObjectView { target } => {
                        if let Some(model) =
                            self.registry.get(target).and_then(Aggregator::object_model)
                        {
                            info!(%target, title = %model.effective_title(), "opening object view");
                            self.views.open_object_view(model);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// State the event store holds for a specification, mainly for
    /// inspection in tests.
    pub fn fetch_state(&self, spec: &ResourceSpecification) -> Option<EventState> {
        self.store.state_of(spec)
    }
}

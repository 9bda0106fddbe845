//! The reconciliation state machines.
//!
//! An aggregator receives [`LogEntry`] callbacks for every resource fetched
//! on its behalf, dispatches on the decoded payload kind, mutates its
//! display model, and decides whether the view is ready to open. Further
//! fetches, child registration, parent notification, and view opening are
//! emitted as commands through [`AggregatorContext`] and applied by the
//! session after `update` returns, so each display model stays exclusively
//! owned by its aggregator.
//!
//! Parent/child: a parented collection aggregator holds only its parent's
//! [`AggregatorId`] — a non-owning back-reference used purely to ask the
//! parent to re-evaluate overall readiness with an empty marker entry. The
//! session registry owns every aggregator; a child is never looked up
//! through its parent.

mod collection;
mod error;
mod object;

pub use collection::CollectionAggregator;
pub use error::AggregatorError;
pub use object::ObjectAggregator;

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::event::{EventState, LogEntry, SubType};
use crate::model::{CollectionDM, ColumnSpecificationHolder, ObjectDM};
use crate::to::{DomainType, Link, Property, Relation};

/// Handle identifying an aggregator inside the session registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AggregatorId(pub(crate) u64);

impl fmt::Display for AggregatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agg-{}", self.0)
    }
}

/// The reconciliation contract every aggregator variant implements.
pub trait Aggregator: Send {
    fn id(&self) -> AggregatorId;

    /// Single entry point for all inbound data. Dispatches synchronously on
    /// the payload kind and re-checks readiness afterwards.
    fn update(
        &mut self,
        entry: &LogEntry,
        ctx: &mut AggregatorContext<'_>,
    ) -> Result<(), AggregatorError>;

    /// Clears the display model's accumulated containers and readiness
    /// flag, so the view can be rebuilt from scratch.
    fn reset(&mut self);

    /// Whether this aggregator's own display model is render-ready.
    fn is_ready(&self) -> bool;

    /// Child aggregators spawned by this one. The session drops them from
    /// the registry when the tree is reset; the next run spawns fresh ones.
    fn children(&self) -> Vec<AggregatorId> {
        Vec::new()
    }

    /// Parent hook: a child collection registers its display model here,
    /// keyed by collection id. Only object aggregators accept children.
    fn adopt_collection(&mut self, collection_id: &str, child: AggregatorId) {
        let _ = (collection_id, child);
    }

    /// The collection model, for collection variants.
    fn collection_model(&self) -> Option<&CollectionDM> {
        None
    }

    /// The object model, for object variants.
    fn object_model(&self) -> Option<&ObjectDM> {
        None
    }
}

/// Owns every live aggregator, keyed by id. Ownership of an aggregation
/// tree flows root to leaf through this registry.
#[derive(Default)]
pub(crate) struct Registry {
    slots: HashMap<AggregatorId, Box<dyn Aggregator>>,
}

impl Registry {
    pub(crate) fn insert(&mut self, id: AggregatorId, aggregator: Box<dyn Aggregator>) {
        self.slots.insert(id, aggregator);
    }

    pub(crate) fn remove(&mut self, id: AggregatorId) -> Option<Box<dyn Aggregator>> {
        self.slots.remove(&id)
    }

    pub(crate) fn get(&self, id: AggregatorId) -> Option<&dyn Aggregator> {
        self.slots.get(&id).map(Box::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: AggregatorId) -> Option<&mut Box<dyn Aggregator>> {
        self.slots.get_mut(&id)
    }
}

/// A deferred effect emitted during `update`.
#[derive(Debug)]
pub(crate) enum Command {
    Fetch {
        link: Link,
        target: AggregatorId,
        referrer: String,
        sub_type: SubType,
    },
    NotifyParent {
        parent: AggregatorId,
    },
    AdoptCollection {
        parent: AggregatorId,
        collection_id: String,
        child: AggregatorId,
    },
    OpenCollectionView {
        target: AggregatorId,
    },
    OpenObjectView {
        target: AggregatorId,
    },
}

/// Buffered outbound effects of one `update` call, plus read access to the
/// rest of the aggregation tree for readiness checks.
pub struct AggregatorContext<'a> {
    registry: &'a Registry,
    next_id: &'a mut u64,
    pub(crate) commands: Vec<Command>,
    pub(crate) spawned: Vec<(AggregatorId, Box<dyn Aggregator>)>,
}

impl<'a> AggregatorContext<'a> {
    pub(crate) fn new(registry: &'a Registry, next_id: &'a mut u64) -> Self {
        Self {
            registry,
            next_id,
            commands: Vec::new(),
            spawned: Vec::new(),
        }
    }

    /// Requests a follow-up fetch of `link` on behalf of `target`, with the
    /// default JSON decoding.
    pub fn fetch(&mut self, link: &Link, target: AggregatorId, referrer: &str) {
        self.fetch_as(link, target, referrer, SubType::Json);
    }

    pub fn fetch_as(&mut self, link: &Link, target: AggregatorId, referrer: &str, sub_type: SubType) {
        self.commands.push(Command::Fetch {
            link: link.clone(),
            target,
            referrer: referrer.to_string(),
            sub_type,
        });
    }

    /// Creates a parented collection aggregator; it is registered with the
    /// session once this update completes.
    pub fn spawn_child_collection(&mut self, title: &str, parent: AggregatorId) -> AggregatorId {
        let id = AggregatorId(*self.next_id);
        *self.next_id += 1;
        self.spawned
            .push((id, Box::new(CollectionAggregator::parented(id, title, parent))));
        id
    }

    /// Asks the parent to re-evaluate overall readiness with an empty
    /// marker entry. Never fetches anything.
    pub fn notify_parent(&mut self, parent: AggregatorId) {
        self.commands.push(Command::NotifyParent { parent });
    }

    pub fn adopt_collection(&mut self, parent: AggregatorId, collection_id: &str, child: AggregatorId) {
        self.commands.push(Command::AdoptCollection {
            parent,
            collection_id: collection_id.to_string(),
            child,
        });
    }

    pub fn open_collection_view(&mut self, target: AggregatorId) {
        self.commands.push(Command::OpenCollectionView { target });
    }

    pub fn open_object_view(&mut self, target: AggregatorId) {
        self.commands.push(Command::OpenObjectView { target });
    }

    /// Readiness of another aggregator in the tree. Aggregators spawned
    /// during the current update are not registered yet and report false.
    pub fn aggregator_ready(&self, id: AggregatorId) -> bool {
        self.registry.get(id).is_some_and(Aggregator::is_ready)
    }
}

/// Shared pre-dispatch guard. `Ok(true)` means the entry may be handled;
/// `Ok(false)` drops an error-state entry after logging it.
pub(crate) fn guard_entry(entry: &LogEntry) -> Result<bool, AggregatorError> {
    match entry.state {
        EventState::Duplicate => Err(AggregatorError::DuplicateDelivered(entry.url().to_string())),
        EventState::Error => {
            warn!(url = entry.url(), fault = ?entry.fault, "fetch failed, dropping this branch");
            Ok(false)
        }
        EventState::Pending | EventState::Success => Ok(true),
    }
}

/// Shared property policy: a resolved description amends the column spec
/// directly, an object-bound property gets its description fetched, and any
/// third shape is explicitly unsupported.
pub(crate) fn reconcile_property(
    property: &Property,
    target: AggregatorId,
    referrer: &str,
    holder: &mut ColumnSpecificationHolder,
    ctx: &mut AggregatorContext<'_>,
) -> Result<(), AggregatorError> {
    if property.is_description() {
        holder.spec_mut(&property.id).amend_with_description(property);
        Ok(())
    } else if let Some(link) = property.described_by_link() {
        ctx.fetch(link, target, referrer);
        Ok(())
    } else {
        Err(AggregatorError::UnsupportedPropertyShape {
            id: property.id.clone(),
        })
    }
}

/// Shared domain-type policy: re-fetch layout-tagged links and every
/// property member.
pub(crate) fn expand_domain_type(
    domain_type: &DomainType,
    target: AggregatorId,
    referrer: &str,
    ctx: &mut AggregatorContext<'_>,
) {
    for link in &domain_type.links {
        if link.rel == Relation::Layout {
            ctx.fetch_as(link, target, referrer, SubType::Xml);
        }
    }
    for link in domain_type.members.values() {
        if link.points_to_property() {
            ctx.fetch(link, target, referrer);
        }
    }
}

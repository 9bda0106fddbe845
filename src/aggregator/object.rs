//! Reconciliation state machine for object views.

use tracing::{debug, info};

use super::{
    expand_domain_type, guard_entry, reconcile_property, Aggregator, AggregatorContext,
    AggregatorError, AggregatorId,
};
use crate::event::{LogEntry, SubType};
use crate::model::ObjectDM;
use crate::to::{GridLayout, TObject, TransferObject};

/// Aggregates one object view. Collection members of the object are handed
/// to parented [`super::CollectionAggregator`]s spawned on first sight of
/// the object; this aggregator then decides tree readiness top-down.
pub struct ObjectAggregator {
    id: AggregatorId,
    dm: ObjectDM,
    /// Children spawned for collection members, recorded at spawn time so
    /// readiness accounts for them before they register their models.
    children: Vec<AggregatorId>,
}

impl ObjectAggregator {
    pub(crate) fn new(id: AggregatorId, title: &str) -> Self {
        Self {
            id,
            dm: ObjectDM::new(title),
            children: Vec::new(),
        }
    }

    pub fn display_model(&self) -> &ObjectDM {
        &self.dm
    }

    fn handle_object(&mut self, obj: &TObject, referrer: &str, ctx: &mut AggregatorContext<'_>) {
        // The same object can be reachable through more than one link; only
        // the first arrival establishes the tree.
        if self.dm.object().is_some() {
            debug!(id = %self.id, url = referrer, "object already recorded");
            return;
        }
        self.dm.set_object(obj);
        if let Some(link) = obj.layout_link() {
            ctx.fetch_as(link, self.id, referrer, SubType::Xml);
        }
        if let Some(link) = obj.icon_link() {
            ctx.fetch(link, self.id, referrer);
        }
        for member in obj.collections() {
            let child = ctx.spawn_child_collection(&member.id, self.id);
            self.children.push(child);
            if let Some(link) = member.resource_link() {
                ctx.fetch(link, child, referrer);
            }
        }
    }

    fn handle_grid(&mut self, grid: &GridLayout, referrer: &str, ctx: &mut AggregatorContext<'_>) {
        self.dm.set_layout(grid);
        for property in grid.property_list() {
            if let Some(link) = &property.link {
                ctx.fetch(link, self.id, referrer);
            }
        }
    }

    fn tree_ready(&self, ctx: &AggregatorContext<'_>) -> bool {
        self.dm.ready_to_render() && self.children.iter().all(|c| ctx.aggregator_ready(*c))
    }
}

impl Aggregator for ObjectAggregator {
    fn id(&self) -> AggregatorId {
        self.id
    }

    fn update(
        &mut self,
        entry: &LogEntry,
        ctx: &mut AggregatorContext<'_>,
    ) -> Result<(), AggregatorError> {
        if guard_entry(entry)? {
            let referrer = entry.url();
            match entry.transfer_object() {
                None => debug!(id = %self.id, url = referrer, "no transfer object, re-evaluating readiness"),
                Some(TransferObject::Object(obj)) => self.handle_object(obj, referrer, ctx),
                Some(TransferObject::Grid(grid)) => self.handle_grid(grid, referrer, ctx),
                Some(TransferObject::DomainType(dt)) => expand_domain_type(dt, self.id, referrer, ctx),
                Some(TransferObject::Property(property)) => {
                    let id = self.id;
                    reconcile_property(property, id, referrer, self.dm.column_specs_mut(), ctx)?;
                }
                Some(TransferObject::Icon(icon)) => self.dm.set_icon(icon.clone()),
                // Collection payloads are addressed to the child aggregators
                // spawned for them; one landing here carries nothing to do.
                Some(TransferObject::Collection(collection)) => {
                    debug!(id = %self.id, collection = %collection.id, "collection payload handled by child aggregators");
                }
                Some(TransferObject::ResultList(_)) => {
                    debug!(id = %self.id, url = referrer, "result list not expected for an object view");
                }
            }
        }

        if self.tree_ready(ctx) && !self.dm.is_rendered() {
            self.dm.mark_rendered();
            info!(id = %self.id, title = %self.dm.effective_title(), "object tree ready");
            ctx.open_object_view(self.id);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.dm.reset();
        self.children = Vec::new();
    }

    fn is_ready(&self) -> bool {
        self.dm.ready_to_render()
    }

    fn children(&self) -> Vec<AggregatorId> {
        self.children.clone()
    }

    fn adopt_collection(&mut self, collection_id: &str, child: AggregatorId) {
        self.dm.add_collection(collection_id, child);
    }

    fn object_model(&self) -> Option<&ObjectDM> {
        Some(&self.dm)
    }
}

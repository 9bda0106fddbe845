//! Reconciliation state machine for collection views.
//!
//! Sequence of operations for a standalone collection:
//! (0) result list  -> one fetch per referenced object
//! (1) object       -> raw data row; first object establishes the prototype
//! (2) layout grid  -> column metadata plus description links
//! (3) property     -> description fetched, then applied to the column spec

use tracing::{debug, info};

use super::{
    expand_domain_type, guard_entry, reconcile_property, Aggregator, AggregatorContext,
    AggregatorError, AggregatorId,
};
use crate::event::{LogEntry, SubType};
use crate::model::CollectionDM;
use crate::to::{Collection, GridLayout, Relation, ResultList, ResultType, TObject, TransferObject};

/// Aggregates one collection view, either standalone (root) or parented
/// under an object aggregator.
pub struct CollectionAggregator {
    id: AggregatorId,
    dm: CollectionDM,
    /// Non-owning back-reference, used only for readiness notification.
    parent: Option<AggregatorId>,
}

impl CollectionAggregator {
    pub(crate) fn new(id: AggregatorId, title: &str) -> Self {
        Self {
            id,
            dm: CollectionDM::new(title),
            parent: None,
        }
    }

    pub(crate) fn parented(id: AggregatorId, title: &str, parent: AggregatorId) -> Self {
        Self {
            id,
            dm: CollectionDM::new(title),
            parent: Some(parent),
        }
    }

    pub fn display_model(&self) -> &CollectionDM {
        &self.dm
    }

    fn handle_list(&mut self, list: &ResultList, referrer: &str, ctx: &mut AggregatorContext<'_>) {
        if list.result_type == ResultType::Void {
            return;
        }
        if let Some(result) = &list.result {
            for link in &result.value {
                ctx.fetch(link, self.id, referrer);
            }
        }
    }

    fn handle_object(&mut self, obj: &TObject, referrer: &str, ctx: &mut AggregatorContext<'_>) {
        self.dm.add_data(obj);
        if !self.dm.has_prototype() {
            self.dm.set_prototype(obj);
            self.dm.set_id(obj.domain_type.clone());
            if let Some(link) = obj.layout_link() {
                ctx.fetch_as(link, self.id, referrer, SubType::Xml);
            }
            if let Some(link) = obj.icon_link() {
                ctx.fetch(link, self.id, referrer);
            }
        }
        self.dm.set_number_of_columns(obj.properties().count());
    }

    fn handle_grid(&mut self, grid: &GridLayout, referrer: &str, ctx: &mut AggregatorContext<'_>) {
        self.dm.set_prototype_layout(grid);
        for property in grid.property_list() {
            if let Some(link) = &property.link {
                ctx.fetch(link, self.id, referrer);
            }
        }
    }

    fn handle_collection(
        &mut self,
        collection: &Collection,
        referrer: &str,
        ctx: &mut AggregatorContext<'_>,
    ) {
        if let Some(parent) = self.parent {
            self.dm.set_id(collection.id.clone());
            ctx.adopt_collection(parent, &collection.id, self.id);
        }
        for link in &collection.links {
            if link.rel == Relation::DescribedBy {
                ctx.fetch(link, self.id, referrer);
            }
        }
        for link in &collection.value {
            ctx.fetch(link, self.id, referrer);
        }
    }
}

impl Aggregator for CollectionAggregator {
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
                None => debug!(id = %self.id, url = referrer, "no transfer object, nothing to reconcile"),
                Some(TransferObject::ResultList(list)) => self.handle_list(list, referrer, ctx),
                Some(TransferObject::Object(obj)) => self.handle_object(obj, referrer, ctx),
                Some(TransferObject::DomainType(dt)) => expand_domain_type(dt, self.id, referrer, ctx),
                Some(TransferObject::Grid(grid)) => self.handle_grid(grid, referrer, ctx),
                Some(TransferObject::Property(property)) => {
                    let id = self.id;
                    reconcile_property(property, id, referrer, self.dm.column_specs_mut(), ctx)?;
                }
                Some(TransferObject::Collection(collection)) => {
                    self.handle_collection(collection, referrer, ctx);
                }
                Some(TransferObject::Icon(icon)) => self.dm.add_icon(icon.clone()),
            }
        }

        match self.parent {
            // Root: open the view exactly once, on the readiness transition.
            None => {
                if self.dm.ready_to_render() && !self.dm.is_rendered() {
                    self.dm.mark_rendered();
                    info!(id = %self.id, title = %self.dm.effective_title(), "collection ready");
                    ctx.open_collection_view(self.id);
                }
            }
            // Parented: readiness is a property of the whole tree, computed
            // by the parent. Always pass an empty marker entry up.
            Some(parent) => ctx.notify_parent(parent),
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.dm.reset();
    }

    fn is_ready(&self) -> bool {
        self.dm.ready_to_render()
    }

    fn collection_model(&self) -> Option<&CollectionDM> {
        Some(&self.dm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{Command, Registry};
    use crate::event::{EventState, ResourceSpecification};
    use crate::to::{Link, ListResult, Property};

    fn ctx_parts() -> (Registry, u64) {
        (Registry::default(), 100)
    }

    fn entry_with(payload: TransferObject) -> LogEntry {
        LogEntry::success(
            ResourceSpecification::new("http://api/test", SubType::Json),
            Some(payload),
        )
    }

    #[test]
    fn duplicate_entry_is_a_protocol_violation_and_mutates_nothing() {
        let (registry, mut next_id) = ctx_parts();
        let mut aggregator = CollectionAggregator::new(AggregatorId(1), "test");
        let mut ctx = AggregatorContext::new(&registry, &mut next_id);

        let mut entry = entry_with(TransferObject::ResultList(ResultList {
            result_type: ResultType::List,
            result: Some(ListResult {
                value: vec![Link::get(Relation::Element, "http://api/objects/1")],
            }),
        }));
        entry.state = EventState::Duplicate;

        let err = aggregator.update(&entry, &mut ctx).unwrap_err();
        assert!(matches!(err, AggregatorError::DuplicateDelivered(_)));
        assert!(ctx.commands.is_empty());
        assert!(aggregator.display_model().raw_data().is_empty());
    }

    #[test]
    fn result_list_expands_into_one_fetch_per_reference() {
        let (registry, mut next_id) = ctx_parts();
        let mut aggregator = CollectionAggregator::new(AggregatorId(1), "test");
        let mut ctx = AggregatorContext::new(&registry, &mut next_id);

        let entry = entry_with(TransferObject::ResultList(ResultList {
            result_type: ResultType::List,
            result: Some(ListResult {
                value: vec![
                    Link::get(Relation::Element, "http://api/objects/1"),
                    Link::get(Relation::Element, "http://api/objects/2"),
                ],
            }),
        }));
        aggregator.update(&entry, &mut ctx).unwrap();

        let fetches: Vec<_> = ctx
            .commands
            .iter()
            .filter(|c| matches!(c, Command::Fetch { .. }))
            .collect();
        assert_eq!(fetches.len(), 2);
    }

    #[test]
    fn void_result_list_expands_into_nothing() {
        let (registry, mut next_id) = ctx_parts();
        let mut aggregator = CollectionAggregator::new(AggregatorId(1), "test");
        let mut ctx = AggregatorContext::new(&registry, &mut next_id);

        let entry = entry_with(TransferObject::ResultList(ResultList {
            result_type: ResultType::Void,
            result: None,
        }));
        aggregator.update(&entry, &mut ctx).unwrap();
        assert!(ctx.commands.is_empty());
    }

    #[test]
    fn unsupported_property_shape_is_an_explicit_error() {
        let (registry, mut next_id) = ctx_parts();
        let mut aggregator = CollectionAggregator::new(AggregatorId(1), "test");
        let mut ctx = AggregatorContext::new(&registry, &mut next_id);

        let entry = entry_with(TransferObject::Property(Property {
            id: "mystery".into(),
            links: vec![],
            extensions: None,
        }));
        let err = aggregator.update(&entry, &mut ctx).unwrap_err();
        assert_eq!(
            err,
            AggregatorError::UnsupportedPropertyShape {
                id: "mystery".into()
            }
        );
    }

    #[test]
    fn parented_aggregator_always_notifies_its_parent() {
        let (registry, mut next_id) = ctx_parts();
        let parent = AggregatorId(7);
        let mut aggregator = CollectionAggregator::parented(AggregatorId(8), "items", parent);
        let mut ctx = AggregatorContext::new(&registry, &mut next_id);

        // Marker entry: no payload, no readiness, still notifies upwards.
        aggregator.update(&LogEntry::marker(), &mut ctx).unwrap();
        assert!(matches!(
            ctx.commands.as_slice(),
            [Command::NotifyParent { parent: p }] if *p == parent
        ));
    }

    #[test]
    fn error_entry_is_dropped_without_mutation() {
        let (registry, mut next_id) = ctx_parts();
        let mut aggregator = CollectionAggregator::new(AggregatorId(1), "test");
        let mut ctx = AggregatorContext::new(&registry, &mut next_id);

        let entry = LogEntry::failure(
            ResourceSpecification::new("http://api/objects/1", SubType::Json),
            "503 service unavailable",
        );
        aggregator.update(&entry, &mut ctx).unwrap();
        assert!(ctx.commands.is_empty());
        assert!(aggregator.display_model().raw_data().is_empty());
    }
}

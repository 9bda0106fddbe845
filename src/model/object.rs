//! The accumulating display model for one object view.

use std::collections::BTreeMap;

use super::column::ColumnSpecificationHolder;
use crate::aggregator::AggregatorId;
use crate::to::{GridLayout, Icon, TObject};

/// The partially-built view state for one domain object, including the
/// child collection models registered under it by id.
#[derive(Debug, Default)]
pub struct ObjectDM {
    title: String,
    object: Option<TObject>,
    layout: Option<GridLayout>,
    icon: Option<Icon>,
    collections: BTreeMap<String, AggregatorId>,
    column_specs: ColumnSpecificationHolder,
    rendered: bool,
}

impl ObjectDM {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn effective_title(&self) -> String {
        if !self.title.is_empty() {
            self.title.clone()
        } else if let Some(obj) = &self.object {
            obj.title.clone()
        } else {
            "untitled".to_string()
        }
    }

    pub fn object(&self) -> Option<&TObject> {
        self.object.as_ref()
    }

    pub(crate) fn set_object(&mut self, obj: &TObject) {
        if self.title.is_empty() {
            self.title = obj.title.clone();
        }
        self.object = Some(obj.clone());
    }

    pub fn layout(&self) -> Option<&GridLayout> {
        self.layout.as_ref()
    }

    pub(crate) fn set_layout(&mut self, grid: &GridLayout) {
        for property in grid.property_list() {
            self.column_specs.spec_mut(&property.id).amend_with_layout(property);
        }
        self.layout = Some(grid.clone());
    }

    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    pub(crate) fn set_icon(&mut self, icon: Icon) {
        self.icon = Some(icon);
    }

    /// Registers a child collection model under this object, keyed by the
    /// collection id.
    pub(crate) fn add_collection(&mut self, id: &str, child: AggregatorId) {
        self.collections.insert(id.to_string(), child);
    }

    pub fn collections(&self) -> &BTreeMap<String, AggregatorId> {
        &self.collections
    }

    pub fn column_specs(&self) -> &ColumnSpecificationHolder {
        &self.column_specs
    }

    pub(crate) fn column_specs_mut(&mut self) -> &mut ColumnSpecificationHolder {
        &mut self.column_specs
    }

    /// Ready once both the object and its layout have arrived. Child
    /// collection readiness is the owning aggregator's concern, since the
    /// children live in the session registry.
    pub fn ready_to_render(&self) -> bool {
        self.object.is_some() && self.layout.is_some()
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub(crate) fn mark_rendered(&mut self) {
        self.rendered = true;
    }

    /// Back to the freshly-constructed state, title aside, so a re-run
    /// rebuilds object, layout, and children from scratch.
    pub(crate) fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.title));
    }
}

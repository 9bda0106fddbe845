//! The accumulating display model for one collection view.

use std::collections::BTreeMap;

use super::column::ColumnSpecificationHolder;
use crate::to::{GridLayout, Icon, TObject};

/// A flattened, renderable row derived from a raw domain object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: BTreeMap<String, String>,
}

impl Row {
    pub fn from_object(obj: &TObject) -> Self {
        let cells = obj
            .properties()
            .map(|m| (m.id.clone(), m.value.clone().unwrap_or_default()))
            .collect();
        Self { cells }
    }
}

/// Table-level layout state inferred before metadata confirms it.
#[derive(Debug, Clone, Default)]
pub struct CollectionLayout {
    pub number_of_columns: usize,
}

/// The partially-built view state for one collection.
///
/// Owned exclusively by its aggregator and mutated only from within
/// `update`; reset replaces internal containers rather than handing out
/// mutable access.
#[derive(Debug, Default)]
pub struct CollectionDM {
    title: String,
    id: String,
    layout: CollectionLayout,
    column_specs: ColumnSpecificationHolder,
    raw: Vec<TObject>,
    rows: Vec<Row>,
    icon: Option<Icon>,
    prototype: Option<TObject>,
    prototype_layout: Option<GridLayout>,
    rendered: bool,
}

impl CollectionDM {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn effective_title(&self) -> String {
        if !self.title.is_empty() {
            self.title.clone()
        } else if !self.id.is_empty() {
            self.id.to_uppercase()
        } else {
            "untitled".to_string()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// First setter wins: a parented collection gets its member id before
    /// any element arrives, a standalone one falls back to the prototype's
    /// domain type.
    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        if self.id.is_empty() {
            self.id = id.into();
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn raw_data(&self) -> &[TObject] {
        &self.raw
    }

    pub fn column_specs(&self) -> &ColumnSpecificationHolder {
        &self.column_specs
    }

    pub(crate) fn column_specs_mut(&mut self) -> &mut ColumnSpecificationHolder {
        &mut self.column_specs
    }

    pub fn layout(&self) -> &CollectionLayout {
        &self.layout
    }

    pub(crate) fn set_number_of_columns(&mut self, n: usize) {
        self.layout.number_of_columns = n;
    }

    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    pub(crate) fn add_icon(&mut self, icon: Icon) {
        self.icon = Some(icon);
    }

    pub fn has_prototype(&self) -> bool {
        self.prototype.is_some()
    }

    pub(crate) fn set_prototype(&mut self, obj: &TObject) {
        self.prototype = Some(obj.clone());
    }

    pub fn prototype_layout(&self) -> Option<&GridLayout> {
        self.prototype_layout.as_ref()
    }

    /// Installs the prototype layout and merges its per-property metadata
    /// into the column specifications.
    pub(crate) fn set_prototype_layout(&mut self, grid: &GridLayout) {
        for property in grid.property_list() {
            self.column_specs.spec_mut(&property.id).amend_with_layout(property);
        }
        self.prototype_layout = Some(grid.clone());
    }

    /// Appends a raw object and its flattened row, unless an object with
    /// the same identity was already received via another link path.
    /// Returns whether the object was actually added.
    pub(crate) fn add_data(&mut self, obj: &TObject) -> bool {
        if self.raw.iter().any(|existing| existing.same_identity(obj)) {
            return false;
        }
        self.raw.push(obj.clone());
        self.rows.push(Row::from_object(obj));
        true
    }

    pub fn ready_to_render(&self) -> bool {
        !self.id.is_empty() && self.column_specs.ready_to_render()
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub(crate) fn mark_rendered(&mut self) {
        self.rendered = true;
    }

    /// Back to the freshly-constructed state, title aside. Anything less
    /// would leave the model render-ready with zero rows, so a re-run
    /// rebuilds prototype, layout, and column specs from scratch.
    pub(crate) fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.title));
    }
}

//! Column specifications, merged incrementally from two sources.

use std::collections::BTreeMap;

use crate::to::{Property, PropertyLayout};

/// Per-property display metadata.
///
/// Built from two independent sources that arrive in any order: the layout
/// grid and the property description. Each source owns its own fields and
/// amending is a plain overwrite, so the merge is commutative and
/// idempotent. The effective column name is computed at read time instead
/// of at merge time for the same reason.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSpecification {
    pub id: String,
    named: String,
    friendly_name: String,
    pub hidden: bool,
    pub typical_length: u32,
    pub multi_line: u32,
    pub described_as: Option<String>,
    pub description: Option<String>,
    layout_amended: bool,
    description_amended: bool,
}

impl ColumnSpecification {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Merges in the layout-grid source.
    pub fn amend_with_layout(&mut self, layout: &PropertyLayout) {
        self.named = layout.named.clone();
        self.hidden = layout.hidden;
        self.typical_length = layout.typical_length;
        self.multi_line = layout.multi_line;
        self.described_as = layout.described_as.clone();
        self.layout_amended = true;
    }

    /// Merges in the property-description source.
    pub fn amend_with_description(&mut self, property: &Property) {
        if let Some(extensions) = &property.extensions {
            self.friendly_name = extensions.friendly_name.clone();
            self.description = extensions.description.clone();
        }
        self.description_amended = true;
    }

    /// Effective column header: the layout name when present, otherwise the
    /// description's friendly name.
    pub fn name(&self) -> &str {
        if self.named.is_empty() {
            &self.friendly_name
        } else {
            &self.named
        }
    }

    /// True once both expected sources have been merged in.
    pub fn fully_amended(&self) -> bool {
        self.layout_amended && self.description_amended
    }
}

/// Mapping from property id to column specification.
///
/// Owns creation-on-first-access so that either source can arrive first.
#[derive(Debug, Clone, Default)]
pub struct ColumnSpecificationHolder {
    specs: BTreeMap<String, ColumnSpecification>,
}

impl ColumnSpecificationHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The specification for `id`, created on first access.
    pub fn spec_mut(&mut self, id: &str) -> &mut ColumnSpecification {
        self.specs
            .entry(id.to_string())
            .or_insert_with(|| ColumnSpecification::new(id))
    }

    pub fn get(&self, id: &str) -> Option<&ColumnSpecification> {
        self.specs.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnSpecification> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// True once at least one specification exists and every specification
    /// is fully amended from all expected sources.
    pub fn ready_to_render(&self) -> bool {
        !self.specs.is_empty() && self.specs.values().all(ColumnSpecification::fully_amended)
    }
}

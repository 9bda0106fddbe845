//! Decoded layout-grid payloads.
//!
//! A grid arranges an object's members into rows; for the browser core the
//! interesting part is the per-property display metadata each row carries,
//! which feeds one half of every column specification.

use serde::{Deserialize, Serialize};

use super::link::Link;

/// Per-property display metadata as it appears inside a layout grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyLayout {
    pub id: String,
    pub named: String,
    pub hidden: bool,
    pub typical_length: u32,
    pub multi_line: u32,
    pub described_as: Option<String>,
    /// Link to the property's description resource, when present.
    pub link: Option<Link>,
}

/// One row of a layout grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    pub properties: Vec<PropertyLayout>,
}

/// A decoded layout grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub rows: Vec<GridRow>,
}

impl GridLayout {
    /// All property layouts across all rows, in document order.
    pub fn property_list(&self) -> impl Iterator<Item = &PropertyLayout> {
        self.rows.iter().flat_map(|r| r.properties.iter())
    }
}

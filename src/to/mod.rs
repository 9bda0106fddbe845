//! The decoded TransferObject model.
//!
//! These are the typed payloads an external codec produces from the raw
//! XML/JSON hypermedia media types. The core never parses wire formats; it
//! dispatches exhaustively on [`TransferObject`] and follows the links the
//! payloads carry.

mod layout;
mod link;
mod object;

pub use layout::{GridLayout, GridRow, PropertyLayout};
pub use link::{Link, Method, Relation};
pub use object::{Member, MemberKind, TObject};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Shape of an invocation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultType {
    List,
    Object,
    Scalar,
    Void,
}

/// The payload of a list-valued invocation result: references to follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    pub value: Vec<Link>,
}

/// A decoded invocation result carrying a list of object references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultList {
    pub result_type: ResultType,
    pub result: Option<ListResult>,
}

/// Decoded domain-type metadata: layout links plus member links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainType {
    pub canonical_name: String,
    pub links: Vec<Link>,
    pub members: BTreeMap<String, Link>,
}

/// A decoded collection member resource: element links plus description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub links: Vec<Link>,
    pub value: Vec<Link>,
}

/// Extensions block of a resolved property description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyExtensions {
    pub friendly_name: String,
    pub description: Option<String>,
}

/// A decoded property resource.
///
/// Two shapes are understood: a resolved property *description* (carries
/// extensions with a friendly name) and an object-bound property that still
/// needs its description fetched (carries a `DescribedBy` link). Anything
/// else is an unsupported shape the aggregators refuse explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub links: Vec<Link>,
    pub extensions: Option<PropertyExtensions>,
}

impl Property {
    pub fn is_description(&self) -> bool {
        self.extensions
            .as_ref()
            .is_some_and(|e| !e.friendly_name.is_empty())
    }

    pub fn described_by_link(&self) -> Option<&Link> {
        self.links.iter().find(|l| l.rel == Relation::DescribedBy)
    }
}

/// A decoded icon resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    pub media_type: String,
    pub data: Vec<u8>,
}

/// The fixed set of payload kinds the core understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransferObject {
    ResultList(ResultList),
    Object(TObject),
    DomainType(DomainType),
    Collection(Collection),
    Property(Property),
    Grid(GridLayout),
    Icon(Icon),
}

impl TransferObject {
    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferObject::ResultList(_) => "result-list",
            TransferObject::Object(_) => "object",
            TransferObject::DomainType(_) => "domain-type",
            TransferObject::Collection(_) => "collection",
            TransferObject::Property(_) => "property",
            TransferObject::Grid(_) => "grid",
            TransferObject::Icon(_) => "icon",
        }
    }
}

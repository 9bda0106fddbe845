//! Hypermedia links: the references discovered inside fetched resources
//! that drive all further fetches.

use serde::{Deserialize, Serialize};

/// Relation tag carried by a hypermedia link.
///
/// The reconciliation policy keys off a handful of these; anything else a
/// server sends is carried through untouched and simply never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    SelfRel,
    Up,
    DescribedBy,
    Layout,
    Element,
    ElementType,
    Icon,
    Invoke,
}

/// HTTP method a link is meant to be followed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A reference (URL plus relation/method metadata) discovered inside a
/// fetched resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub rel: Relation,
    pub method: Method,
    pub href: String,
}

impl Link {
    /// Convenience constructor for the common GET case.
    pub fn get(rel: Relation, href: impl Into<String>) -> Self {
        Self {
            rel,
            method: Method::Get,
            href: href.into(),
        }
    }

    /// Whether this link addresses a property resource. Domain-type members
    /// are plain links; this is how property members are told apart.
    pub fn points_to_property(&self) -> bool {
        self.href.contains("/properties/")
    }
}

//! The decoded domain-object payload and its members.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::link::{Link, Relation};

/// What kind of member a domain object exposes under a given id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    Property,
    Collection,
    Action,
}

/// One member (property, collection, or action) of a domain object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub kind: MemberKind,
    /// Scalar value for property members, rendered as text by the codec.
    pub value: Option<String>,
    pub links: Vec<Link>,
}

impl Member {
    pub fn is_property(&self) -> bool {
        self.kind == MemberKind::Property
    }

    pub fn is_collection(&self) -> bool {
        self.kind == MemberKind::Collection
    }

    /// The member's own resource link, when the server exposes one.
    pub fn resource_link(&self) -> Option<&Link> {
        self.links.first()
    }
}

/// A decoded domain object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TObject {
    pub title: String,
    pub domain_type: String,
    pub instance_id: String,
    pub links: Vec<Link>,
    pub members: BTreeMap<String, Member>,
}

impl TObject {
    pub fn properties(&self) -> impl Iterator<Item = &Member> {
        self.members.values().filter(|m| m.is_property())
    }

    pub fn collections(&self) -> impl Iterator<Item = &Member> {
        self.members.values().filter(|m| m.is_collection())
    }

    pub fn layout_link(&self) -> Option<&Link> {
        self.links.iter().find(|l| l.rel == Relation::Layout)
    }

    pub fn icon_link(&self) -> Option<&Link> {
        self.links.iter().find(|l| l.rel == Relation::Icon)
    }

    /// Identity used for raw-data deduplication. Whether a version check
    /// belongs here as well is unresolved upstream; two fetches of the same
    /// (type, instance) pair are treated as the same object.
    pub fn same_identity(&self, other: &TObject) -> bool {
        self.domain_type == other.domain_type && self.instance_id == other.instance_id
    }
}

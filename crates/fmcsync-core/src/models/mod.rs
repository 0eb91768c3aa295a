//! Data models for management API entities.
//!
//! This module contains the structures used to represent API data and
//! snapshot contents:
//!
//! - `ListResponse`, `Links`, `Paging`: the common listing envelope
//! - `DomainInfo`: management-plane domain partitions
//! - `AccessPolicy`, `AccessRule`: access-control policies and their rules
//! - `DynamicObject`, `StaticObject`, `Literal`: network objects
//!
//! Entity structs keep any field they do not model in a flattened `extra`
//! map, so snapshots preserve everything the API returned.

pub mod domain;
pub mod object;
pub mod policy;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use domain::DomainInfo;
pub use object::{
    DynamicObject, DynamicObjectMapping, Literal, MappingAction, NewDynamicObject, StaticObject,
};
pub use policy::{AccessPolicy, AccessRule, ResolvedRule};

/// Listing envelope shared by every collection endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl<T> ListResponse<T> {
    /// Link to the next page, if the server reported one
    pub fn next_link(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Links {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Paging {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub count: Option<u64>,
    pub pages: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next: Vec<String>,
}

/// Self link of an entity's `links` block, if present
pub(crate) fn self_link(links: &Option<Links>) -> Option<&str> {
    links
        .as_ref()
        .and_then(|l| l.self_link.as_deref())
        .filter(|l| !l.is_empty())
}

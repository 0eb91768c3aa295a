use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{self_link, Links};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccessPolicy {
    /// Policies without both an id and a name cannot be synced to a file
    pub fn is_addressable(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty()
    }
}

/// An access rule. Listings return a summary; the detail object fetched
/// through `links.self` carries the full rule in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRule {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccessRule {
    pub fn self_link(&self) -> Option<&str> {
        self_link(&self.links)
    }

    /// Object ids listed under `<field>.objects[].id`, e.g. `sourceNetworks`
    pub fn network_object_ids(&self, field: &str) -> Vec<&str> {
        self.extra
            .get(field)
            .and_then(|networks| networks.get("objects"))
            .and_then(Value::as_array)
            .map(|objects| {
                objects
                    .iter()
                    .filter_map(|o| o.get("id").and_then(Value::as_str))
                    .filter(|id| !id.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Attach the addresses behind the rule's source and destination network
    /// objects. Ids missing from `addresses_by_id` contribute nothing.
    pub fn resolve(self, addresses_by_id: &HashMap<String, Vec<String>>) -> ResolvedRule {
        let lookup = |field: &str| -> Vec<String> {
            self.network_object_ids(field)
                .into_iter()
                .filter_map(|id| addresses_by_id.get(id))
                .flatten()
                .cloned()
                .collect()
        };
        let source_ips = lookup("sourceNetworks");
        let destination_ips = lookup("destinationNetworks");

        ResolvedRule {
            rule: self,
            source_ips,
            destination_ips,
        }
    }
}

/// A rule with its network objects expanded to addresses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRule {
    #[serde(flatten)]
    pub rule: AccessRule,
    pub source_ips: Vec<String>,
    pub destination_ips: Vec<String>,
}

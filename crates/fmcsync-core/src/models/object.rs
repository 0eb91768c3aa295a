use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{self_link, Links};

/// Server-side object type whose membership is a list of IP mappings
pub const IP_OBJECT_TYPE: &str = "IP";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicObject {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "objectType", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    /// Mapped IP addresses, filled in separately from the listing
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DynamicObject {
    pub fn is_ip_typed(&self) -> bool {
        self.object_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case(IP_OBJECT_TYPE))
            .unwrap_or(false)
    }
}

/// One entry of a dynamic object's `/mappings` listing
#[derive(Debug, Clone, Deserialize)]
pub struct DynamicObjectMapping {
    #[serde(default)]
    pub mapping: Option<String>,
}

/// Body for creating a dynamic object
#[derive(Debug, Clone, Serialize)]
pub struct NewDynamicObject {
    pub name: String,
    #[serde(rename = "objectType")]
    pub object_type: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticObject {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    /// Group members, copied from the detail object for network groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literals: Option<Vec<Literal>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StaticObject {
    pub fn self_link(&self) -> Option<&str> {
        self_link(&self.links)
    }

    /// Addresses this object stands for: its non-empty literal values when it
    /// carries literals, otherwise its own value.
    pub fn addresses(&self) -> Vec<String> {
        match &self.literals {
            Some(literals) => literals
                .iter()
                .filter(|l| !l.value.is_empty())
                .map(|l| l.value.clone())
                .collect(),
            None => self.value.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub value: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mutation selected through the `action` query parameter of `/mappings`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingAction {
    Add,
    Remove,
}

impl MappingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingAction::Add => "add",
            MappingAction::Remove => "remove",
        }
    }
}

impl fmt::Display for MappingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MappingAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(MappingAction::Add),
            "remove" => Ok(MappingAction::Remove),
            other => Err(anyhow::anyhow!(
                "Unknown mapping action '{}' (expected add or remove)",
                other
            )),
        }
    }
}

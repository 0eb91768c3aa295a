use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{AccessRule, DynamicObject, ResolvedRule, StaticObject};
use crate::utils::{format_age, safe_filename};

/// Dynamic objects, written as a bare JSON array
pub const DYNAMIC_OBJECTS_FILE: &str = "FP_DO.json";

/// Static objects, written as `{"items": [...]}`
pub const STATIC_OBJECTS_FILE: &str = "FP_SO.json";

/// Per-policy rule files live in this subdirectory
pub const POLICY_RULES_DIR: &str = "acp_rules";

const JSON_INDENT: &[u8] = b"    ";

#[derive(Debug, Serialize, Deserialize)]
struct ItemsWrapper<T> {
    items: Vec<T>,
}

/// Last-write times of each snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotAges {
    pub dynamic_objects: Option<DateTime<Utc>>,
    pub static_objects: Option<DateTime<Utc>>,
    pub policies: Option<DateTime<Utc>>,
}

impl SnapshotAges {
    /// Relative age such as "5m ago", or "never"
    pub fn describe(at: Option<DateTime<Utc>>) -> String {
        at.map(|at| format_age((Utc::now() - at).num_minutes()))
            .unwrap_or_else(|| "never".to_string())
    }

    /// Most recent write across all snapshots
    pub fn newest(&self) -> Option<DateTime<Utc>> {
        [self.policies, self.dynamic_objects, self.static_objects]
            .into_iter()
            .flatten()
            .max()
    }

    pub fn last_updated(&self) -> String {
        Self::describe(self.newest())
    }
}

pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn rules_dir(&self) -> PathBuf {
        self.data_dir.join(POLICY_RULES_DIR)
    }

    /// Write pretty JSON (4-space indent) via a temp file and rename, so
    /// readers never see a half-written snapshot.
    fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value
            .serialize(&mut serializer)
            .with_context(|| format!("Failed to serialize {}", path.display()))?;
        buf.push(b'\n');

        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)
                .with_context(|| format!("Failed to create {}", tmp.display()))?;
            file.write_all(&buf)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move snapshot into place: {}", path.display()))?;

        debug!(path = %path.display(), bytes = buf.len(), "Wrote snapshot");
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
        Ok(Some(value))
    }

    // ===== Dynamic Objects =====

    pub fn save_dynamic_objects(&self, objects: &[DynamicObject]) -> Result<PathBuf> {
        let path = self.data_dir.join(DYNAMIC_OBJECTS_FILE);
        Self::write_json(&path, objects)?;
        Ok(path)
    }

    pub fn load_dynamic_objects(&self) -> Result<Option<Vec<DynamicObject>>> {
        Self::read_json(&self.data_dir.join(DYNAMIC_OBJECTS_FILE))
    }

    /// Whether the local snapshot already lists a dynamic object by that name
    pub fn dynamic_object_exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .load_dynamic_objects()?
            .map(|objects| objects.iter().any(|o| o.name == name))
            .unwrap_or(false))
    }

    // ===== Static Objects =====

    pub fn save_static_objects(&self, objects: &[StaticObject]) -> Result<PathBuf> {
        #[derive(Serialize)]
        struct Borrowed<'a> {
            items: &'a [StaticObject],
        }

        let path = self.data_dir.join(STATIC_OBJECTS_FILE);
        Self::write_json(&path, &Borrowed { items: objects })?;
        Ok(path)
    }

    pub fn load_static_objects(&self) -> Result<Option<Vec<StaticObject>>> {
        let wrapped: Option<ItemsWrapper<StaticObject>> =
            Self::read_json(&self.data_dir.join(STATIC_OBJECTS_FILE))?;
        Ok(wrapped.map(|w| w.items))
    }

    // ===== Policy Rules =====

    /// File name a policy's rules are written under
    pub fn policy_file_name(policy_name: &str) -> String {
        format!("{}.json", safe_filename(policy_name))
    }

    /// Write the rules of one policy to `acp_rules/<safe name>.json`
    pub fn save_policy_rules(&self, policy_name: &str, rules: &[AccessRule]) -> Result<PathBuf> {
        let dir = self.rules_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let path = dir.join(Self::policy_file_name(policy_name));
        Self::write_json(&path, rules)?;
        Ok(path)
    }

    /// Load a rules file by the name `policy_files` returned
    pub fn load_policy_rules(&self, file_name: &str) -> Result<Option<Vec<AccessRule>>> {
        let is_plain_name = Path::new(file_name)
            .file_name()
            .map(|n| n == file_name)
            .unwrap_or(false);
        if !is_plain_name {
            anyhow::bail!("Invalid policy file name: {}", file_name);
        }
        Self::read_json(&self.rules_dir().join(file_name))
    }

    /// Load a rules file with each rule's source and destination network
    /// objects expanded to addresses from the static object snapshot
    pub fn load_resolved_rules(&self, file_name: &str) -> Result<Option<Vec<ResolvedRule>>> {
        let Some(rules) = self.load_policy_rules(file_name)? else {
            return Ok(None);
        };
        let index = self.address_index()?;
        Ok(Some(rules.into_iter().map(|rule| rule.resolve(&index)).collect()))
    }

    /// Static object id to addresses. Empty when no static snapshot exists.
    pub fn address_index(&self) -> Result<HashMap<String, Vec<String>>> {
        Ok(self
            .load_static_objects()?
            .unwrap_or_default()
            .into_iter()
            .filter(|o| !o.id.is_empty())
            .map(|o| {
                let addresses = o.addresses();
                (o.id, addresses)
            })
            .collect())
    }

    /// Sorted `*.json` file names under the rules directory
    pub fn policy_files(&self) -> Result<Vec<String>> {
        let dir = self.rules_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("Failed to list {}", dir.display()))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".json") && entry.file_type()?.is_file() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    // ===== Ages =====

    fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from)
    }

    pub fn ages(&self) -> SnapshotAges {
        let newest_rules = self
            .policy_files()
            .unwrap_or_default()
            .iter()
            .filter_map(|name| Self::modified_at(&self.rules_dir().join(name)))
            .max();

        SnapshotAges {
            dynamic_objects: Self::modified_at(&self.data_dir.join(DYNAMIC_OBJECTS_FILE)),
            static_objects: Self::modified_at(&self.data_dir.join(STATIC_OBJECTS_FILE)),
            policies: newest_rules,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use tempfile::TempDir;

    use super::*;

    fn dynamic(value: Value) -> DynamicObject {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_dynamic_objects_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();

        let objects = vec![
            dynamic(json!({"id": "d2", "name": "zeta", "objectType": "IP", "content": ["10.0.0.2"],
                           "type": "DynamicObject", "metadata": {"domain": {"name": "Global"}}})),
            dynamic(json!({"id": "d1", "name": "alpha", "objectType": "IP", "content": []})),
        ];
        store.save_dynamic_objects(&objects).unwrap();

        let loaded = store.load_dynamic_objects().unwrap().unwrap();
        assert_eq!(loaded, objects);
        assert_eq!(loaded[0].extra.get("metadata").unwrap()["domain"]["name"], "Global");
    }

    #[test]
    fn test_dynamic_objects_written_as_bare_array() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        let path = store
            .save_dynamic_objects(&[dynamic(json!({"id": "d1", "name": "alpha"}))])
            .unwrap();

        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.starts_with("[\n    {\n        \"id\": \"d1\""));
        assert!(contents.ends_with("]\n"));
    }

    #[test]
    fn test_static_objects_wrapped_in_items() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        let objects: Vec<StaticObject> = serde_json::from_value(json!([
            {"id": "n1", "name": "lan", "type": "Network", "value": "10.0.0.0/8"},
            {"id": "g1", "name": "servers", "type": "NetworkGroup",
             "literals": [{"type": "Host", "value": "10.1.1.1"}]}
        ]))
        .unwrap();

        store.save_static_objects(&objects).unwrap();

        let raw: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(STATIC_OBJECTS_FILE)).unwrap())
                .unwrap();
        assert_eq!(raw["items"].as_array().unwrap().len(), 2);

        assert_eq!(store.load_static_objects().unwrap().unwrap(), objects);
    }

    #[test]
    fn test_missing_snapshots_load_as_none() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        assert!(store.load_dynamic_objects().unwrap().is_none());
        assert!(store.load_static_objects().unwrap().is_none());
        assert!(store.policy_files().unwrap().is_empty());
        assert!(!store.dynamic_object_exists("anything").unwrap());
        assert_eq!(store.ages().last_updated(), "never");
    }

    #[test]
    fn test_malformed_snapshot_is_error() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        fs::write(dir.path().join(DYNAMIC_OBJECTS_FILE), "{not json").unwrap();
        assert!(store.load_dynamic_objects().is_err());
    }

    #[test]
    fn test_policy_rules_files() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        let rules: Vec<AccessRule> =
            serde_json::from_value(json!([{"id": "r1", "name": "allow", "action": "ALLOW"}])).unwrap();

        store.save_policy_rules("Default Policy", &rules).unwrap();
        store.save_policy_rules("DMZ/Inbound", &[]).unwrap();
        fs::write(dir.path().join(POLICY_RULES_DIR).join("notes.txt"), "ignored").unwrap();

        assert_eq!(
            store.policy_files().unwrap(),
            vec!["DMZ_Inbound.json".to_string(), "Default_Policy.json".to_string()]
        );
        assert_eq!(store.load_policy_rules("Default_Policy.json").unwrap().unwrap(), rules);
        assert!(store.load_policy_rules("../FP_DO.json").is_err());
        assert_eq!(SnapshotAges::describe(store.ages().policies), "just now");
    }

    #[test]
    fn test_resolved_rules_join_static_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();

        let statics: Vec<StaticObject> = serde_json::from_value(json!([
            {"id": "ng-1", "name": "servers", "literals": [{"value": "10.1.1.1"}, {"value": "10.1.1.2"}]},
            {"id": "h-1", "name": "dns", "value": "10.0.0.53"}
        ]))
        .unwrap();
        store.save_static_objects(&statics).unwrap();

        let rules: Vec<AccessRule> = serde_json::from_value(json!([
            {"id": "r1", "name": "to-dns",
             "sourceNetworks": {"objects": [{"id": "ng-1"}]},
             "destinationNetworks": {"objects": [{"id": "h-1"}, {"id": "gone"}]}},
            {"id": "r2", "name": "any"}
        ]))
        .unwrap();
        store.save_policy_rules("Branch Office", &rules).unwrap();

        let resolved = store.load_resolved_rules("Branch_Office.json").unwrap().unwrap();
        assert_eq!(resolved[0].source_ips, vec!["10.1.1.1", "10.1.1.2"]);
        assert_eq!(resolved[0].destination_ips, vec!["10.0.0.53"]);
        assert!(resolved[1].source_ips.is_empty());
        assert!(resolved[1].destination_ips.is_empty());

        assert!(store.load_resolved_rules("Missing.json").unwrap().is_none());
    }

    #[test]
    fn test_resolved_rules_without_static_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        let rules: Vec<AccessRule> = serde_json::from_value(json!([
            {"id": "r1", "sourceNetworks": {"objects": [{"id": "ng-1"}]}}
        ]))
        .unwrap();
        store.save_policy_rules("p", &rules).unwrap();

        assert!(store.address_index().unwrap().is_empty());
        let resolved = store.load_resolved_rules("p.json").unwrap().unwrap();
        assert!(resolved[0].source_ips.is_empty());
    }

    #[test]
    fn test_dynamic_object_exists() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        store
            .save_dynamic_objects(&[dynamic(json!({"id": "d1", "name": "blocklist"}))])
            .unwrap();
        assert!(store.dynamic_object_exists("blocklist").unwrap());
        assert!(!store.dynamic_object_exists("Blocklist").unwrap());
    }

    #[test]
    fn test_snapshot_ages_last_updated_picks_newest() {
        let now = Utc::now();
        let ages = SnapshotAges {
            dynamic_objects: Some(now - chrono::Duration::minutes(5)),
            static_objects: Some(now - chrono::Duration::minutes(1)),
            policies: Some(now - chrono::Duration::hours(3)),
        };
        assert_eq!(ages.newest(), ages.static_objects);
        assert_eq!(ages.last_updated(), "1m ago");

        assert_eq!(SnapshotAges::default().last_updated(), "never");
    }
}

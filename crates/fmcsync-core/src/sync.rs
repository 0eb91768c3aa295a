//! Sync orchestration: fetch each entity type and write its snapshot.
//!
//! Item-level request failures are skipped inside the `FmcClient` detail
//! loops. Authentication failures and snapshot write errors stop the sync
//! and are returned with the `ApiError` preserved in the chain.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::FmcClient;
use crate::snapshot::SnapshotStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    Policies,
    DynamicObjects,
    StaticObjects,
    All,
}

impl FromStr for SyncTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "policies" | "acp" => Ok(SyncTarget::Policies),
            "dynamic" | "do" => Ok(SyncTarget::DynamicObjects),
            "static" | "so" => Ok(SyncTarget::StaticObjects),
            "all" => Ok(SyncTarget::All),
            other => Err(anyhow::anyhow!(
                "Unknown sync target '{}' (expected policies, dynamic, static or all)",
                other
            )),
        }
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncTarget::Policies => "policies",
            SyncTarget::DynamicObjects => "dynamic",
            SyncTarget::StaticObjects => "static",
            SyncTarget::All => "all",
        };
        f.write_str(name)
    }
}

/// Counts from one policy sync
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicySync {
    pub policies: usize,
    pub rules: usize,
    pub overwritten: Vec<String>,
}

/// What one sync run wrote
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub target: String,
    pub policies: usize,
    pub rules: usize,
    pub dynamic_objects: usize,
    pub static_objects: usize,
    /// Policies whose rules file a later policy with the same file name replaced
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overwritten_policies: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

impl SyncReport {
    fn new(target: SyncTarget) -> Self {
        Self {
            target: target.to_string(),
            policies: 0,
            rules: 0,
            dynamic_objects: 0,
            static_objects: 0,
            overwritten_policies: Vec::new(),
            completed_at: Utc::now(),
        }
    }
}

pub struct Syncer<'a> {
    client: &'a FmcClient,
    store: &'a SnapshotStore,
}

impl<'a> Syncer<'a> {
    pub fn new(client: &'a FmcClient, store: &'a SnapshotStore) -> Self {
        Self { client, store }
    }

    /// Fetch every policy's rules and write one file per policy.
    /// Two names that map to the same file leave only the later policy's rules.
    pub async fn sync_policies(&self) -> Result<PolicySync> {
        let policies = self
            .client
            .fetch_access_policies()
            .await
            .context("Failed to fetch access control policies")?;

        let mut outcome = PolicySync::default();
        let mut writers: HashMap<String, String> = HashMap::new();
        for policy in policies {
            if !policy.is_addressable() {
                warn!(id = %policy.id, "Skipping policy without id or name");
                continue;
            }

            info!(policy = %policy.name, id = %policy.id, "Fetching rules");
            let rules = self
                .client
                .fetch_access_rules(&policy.id)
                .await
                .with_context(|| format!("Failed to fetch rules for policy '{}'", policy.name))?;

            let file = SnapshotStore::policy_file_name(&policy.name);
            if let Some(previous) = writers.insert(file.clone(), policy.name.clone()) {
                warn!(policy = %policy.name, replaced = %previous, file = %file, "Policy file name collision, overwriting");
                outcome.overwritten.push(previous);
            }

            let path = self.store.save_policy_rules(&policy.name, &rules)?;
            info!(policy = %policy.name, rules = rules.len(), path = %path.display(), "Saved policy rules");
            outcome.policies += 1;
            outcome.rules += rules.len();
        }

        Ok(outcome)
    }

    pub async fn sync_dynamic_objects(&self) -> Result<usize> {
        let objects = self
            .client
            .fetch_dynamic_objects()
            .await
            .context("Failed to fetch dynamic objects")?;
        let path = self.store.save_dynamic_objects(&objects)?;
        info!(count = objects.len(), path = %path.display(), "Saved dynamic objects");
        Ok(objects.len())
    }

    pub async fn sync_static_objects(&self) -> Result<usize> {
        let objects = self
            .client
            .fetch_static_objects()
            .await
            .context("Failed to fetch static objects")?;
        let path = self.store.save_static_objects(&objects)?;
        info!(count = objects.len(), path = %path.display(), "Saved static objects");
        Ok(objects.len())
    }

    /// Run the selected syncs in order: policies, dynamic, static.
    /// Stops at the first error.
    pub async fn run(&self, target: SyncTarget) -> Result<SyncReport> {
        let mut report = SyncReport::new(target);

        if matches!(target, SyncTarget::Policies | SyncTarget::All) {
            let outcome = self.sync_policies().await?;
            report.policies = outcome.policies;
            report.rules = outcome.rules;
            report.overwritten_policies = outcome.overwritten;
        }
        if matches!(target, SyncTarget::DynamicObjects | SyncTarget::All) {
            report.dynamic_objects = self.sync_dynamic_objects().await?;
        }
        if matches!(target, SyncTarget::StaticObjects | SyncTarget::All) {
            report.static_objects = self.sync_static_objects().await?;
        }

        report.completed_at = Utc::now();
        info!(sync = %target, "Sync complete");
        Ok(report)
    }
}

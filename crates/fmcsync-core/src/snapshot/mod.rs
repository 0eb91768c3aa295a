//! Flat JSON snapshots of fetched API data.
//!
//! This module provides the `SnapshotStore`, which writes what a sync
//! fetched so that read-only presentation code can render it later:
//! - `FP_DO.json`: dynamic objects with their mapped IPs
//! - `FP_SO.json`: static objects with group literals
//! - `acp_rules/*.json`: full rule details, one file per access policy

pub mod store;

pub use store::{SnapshotAges, SnapshotStore};

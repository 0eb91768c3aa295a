//! fmcsync core library.
//!
//! Authenticated access to the Firepower Management Center REST API,
//! endpoint call sites for policies and network objects, and the flat JSON
//! snapshot store the sync writes into.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod snapshot;
pub mod sync;
pub mod utils;

pub use api::{ApiError, FmcClient};
pub use auth::{ApiRequest, Credentials, Session, TokenCell};
pub use config::Config;
pub use snapshot::SnapshotStore;
pub use sync::{PolicySync, SyncReport, SyncTarget, Syncer};

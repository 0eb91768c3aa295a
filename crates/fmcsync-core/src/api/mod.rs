//! REST API client module for the Firepower Management Center.
//!
//! This module provides the `FmcClient` for fetching access-control
//! policies, rules, dynamic objects and static objects, and for mutating
//! dynamic-object mappings.
//!
//! Every call goes through the authenticated `Session`, which carries the
//! `X-auth-access-token` header and refreshes it once on a 401.

pub mod client;
pub mod error;

pub use client::FmcClient;
pub use error::ApiError;

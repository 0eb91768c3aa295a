//! Authentication module for the management API.
//!
//! This module provides:
//! - `Session`: authenticated request execution with a single 401-triggered refresh
//! - `TokenCell`: the shared single-slot access token
//! - `Credentials`: host, username, password and TLS policy for one deployment
//! - `CredentialStore`: secure OS-level password storage via keyring
//!
//! Tokens carry no expiry; a stale token is only discovered when a call is rejected.

pub mod credentials;
pub mod session;
pub mod token;

pub use credentials::{CredentialStore, Credentials};
pub use session::{ApiRequest, Session, TOKEN_HEADER};
pub use token::TokenCell;

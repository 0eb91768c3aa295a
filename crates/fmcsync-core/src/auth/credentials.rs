use std::fmt;

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "fmcsync";

/// Connection settings for one management host.
#[derive(Clone)]
pub struct Credentials {
    pub host: String,
    pub username: String,
    pub password: String,
    pub verify_ssl: bool,
}

impl Credentials {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        verify_ssl: bool,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            verify_ssl,
        }
    }

    /// True when every field needed for the token exchange is set
    pub fn is_complete(&self) -> bool {
        !self.host.trim().is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }

    /// Base URL for all API paths.
    /// Bare hosts get `https://`; an explicit scheme is kept as given.
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("https://") || host.starts_with("http://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

pub struct CredentialStore;

impl CredentialStore {
    /// Store username and password in the OS keychain
    pub fn store(username: &str, password: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve password for a username from the OS keychain
    pub fn get_password(username: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve password from keychain")
    }
}

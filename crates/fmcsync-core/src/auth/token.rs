use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Single-slot holder for the access token.
///
/// Clones share the same slot. Each `get` and `replace` takes the lock once,
/// so a reader never observes a half-written token.
#[derive(Clone, Default)]
pub struct TokenCell {
    slot: Arc<Mutex<Option<String>>>,
}

impl TokenCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cell that already holds a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Store a new token, returning the one it replaced
    pub fn replace(&self, token: String) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token)
    }

    pub fn is_present(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for TokenCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_present() { "<held>" } else { "<empty>" };
        f.debug_struct("TokenCell").field("token", &state).finish()
    }
}

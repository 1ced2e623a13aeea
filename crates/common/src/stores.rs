//! Credential and session store contracts
//!
//! The original front end keeps the API key and a handful of UI flags in
//! browser local storage. Here those surfaces become injectable traits with
//! in-memory implementations; the read/write contract is all the rest of
//! the system depends on.

use std::collections::HashMap;
use std::sync::RwLock;

/// Session-store key for the last daily check-in date (YYYY-MM-DD)
pub const LAST_CHECK_IN_DATE: &str = "LAST_CHECK_IN_DATE";

/// Storage for the generation API credential.
///
/// Read once per job submission attempt; cleared when the remote service
/// classifies the key as invalid.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, key: String);
    fn clear(&self);
}

/// Per-session persisted UI state (last check-in date and friends)
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// In-memory credential store
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    key: RwLock<Option<String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: RwLock::new(Some(key.into())),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.key.read().unwrap().clone()
    }

    fn set(&self, key: String) {
        *self.key.write().unwrap() = Some(key);
    }

    fn clear(&self) {
        *self.key.write().unwrap() = None;
    }
}

/// In-memory session store
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().unwrap().get(key).cloned()
    }

    fn put(&self, key: &str, value: String) {
        self.values.write().unwrap().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.values.write().unwrap().remove(key);
    }
}

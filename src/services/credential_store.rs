//! Bearer credential ownership.
//!
//! The store is the only writer of the token slot. Reads never fail from the
//! caller's point of view: storage faults are logged and treated as "no
//! token", which sends the rest of the client down the logged-out path.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::domain::ports::TokenStorage;

/// Single owner of the access token.
pub struct CredentialStore {
    storage: Arc<dyn TokenStorage>,
    /// Debug credential consulted at most once, on the first empty read.
    fallback: Mutex<Option<String>>,
}

impl CredentialStore {
    /// Store over `storage`, without a fallback token.
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            storage,
            fallback: Mutex::new(None),
        }
    }

    /// Seed an empty store with `token` on first read.
    pub fn with_fallback(mut self, token: Option<String>) -> Self {
        self.fallback = Mutex::new(token.filter(|t| !t.is_empty()));
        self
    }

    /// Current token, seeding from the fallback when storage is empty.
    pub fn get(&self) -> Option<String> {
        if let Some(token) = self.read_stored() {
            return Some(token);
        }

        let seed = self.fallback.lock().take()?;
        tracing::info!("seeding empty credential store from configured debug token");
        self.persist(&seed);
        Some(seed)
    }

    /// Replace the token; `None` stores the empty marker.
    pub fn set(&self, token: Option<String>) {
        self.persist(token.as_deref().unwrap_or_default());
    }

    /// Forget the token and the fallback, so the session cannot re-seed.
    pub fn clear(&self) {
        self.fallback.lock().take();
        self.persist("");
        tracing::debug!("credential cleared");
    }

    /// Whether a non-empty token is stored.
    pub fn has_valid(&self) -> bool {
        self.get().is_some_and(|token| !token.is_empty())
    }

    fn read_stored(&self) -> Option<String> {
        match self.storage.load() {
            Ok(value) => value.filter(|token| !token.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored credential, treating as absent");
                None
            }
        }
    }

    fn persist(&self, value: &str) {
        if let Err(e) = self.storage.store(value) {
            tracing::warn!(error = %e, "failed to persist credential");
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("fallback_pending", &self.fallback.lock().is_some())
            .finish_non_exhaustive()
    }
}

//! In-memory token slot.

use parking_lot::RwLock;

use crate::domain::errors::DomainResult;
use crate::domain::ports::TokenStorage;

/// Process-local token slot. Lost on exit.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    value: RwLock<Option<String>>,
}

impl MemoryTokenStorage {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            value: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> DomainResult<Option<String>> {
        Ok(self.value.read().clone())
    }

    fn store(&self, value: &str) -> DomainResult<()> {
        *self.value.write() = Some(value.to_string());
        Ok(())
    }
}

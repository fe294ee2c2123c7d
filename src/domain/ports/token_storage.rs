//! Token persistence port.

use crate::domain::errors::DomainResult;

/// Durable key-value slot holding the bearer token.
///
/// An empty string represents "no token". Implementations must survive
/// process restarts; the in-memory variant exists for tests only.
pub trait TokenStorage: Send + Sync {
    /// Read the raw stored value, `None` when nothing was ever written.
    fn load(&self) -> DomainResult<Option<String>>;

    /// Overwrite the stored value.
    fn store(&self, value: &str) -> DomainResult<()>;
}

//! Credentials management infrastructure
//!
//! Durable storage for the bearer token:
//! - File-backed JSON slot for the CLI
//! - In-memory slot for tests and embedding
pub mod file_storage;
pub mod memory_storage;

pub use file_storage::FileTokenStorage;
pub use memory_storage::MemoryTokenStorage;

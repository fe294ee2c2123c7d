//! JSON file holding the token under a single key.
//!
//! The file is a flat JSON object so other string entries written by other
//! tools survive our writes:
//!
//! ```json
//! { "access_token": "eyJhbGciOi..." }
//! ```

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::CredentialsConfig;
use crate::domain::ports::TokenStorage;

/// Token kept under one key of a JSON object file.
///
/// Other keys in the file are preserved on write.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
    key: String,
}

impl FileTokenStorage {
    /// Storage for `key` in the file at `path`.
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Storage at the configured path and key.
    pub fn from_config(config: &CredentialsConfig) -> Self {
        Self::new(&config.path, &config.key)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> DomainResult<Option<Map<String, Value>>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::Storage(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if raw.trim().is_empty() {
            return Ok(Some(Map::new()));
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(entries)) => Ok(Some(entries)),
            Ok(_) => Err(DomainError::Storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(DomainError::Storage(format!(
                "failed to parse {}: {e}",
                self.path.display()
            ))),
        }
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> DomainResult<Option<String>> {
        let Some(entries) = self.read_entries()? else {
            return Ok(None);
        };
        Ok(entries
            .get(&self.key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn store(&self, value: &str) -> DomainResult<()> {
        // A corrupt file is replaced rather than blocking logout.
        let mut entries = self.read_entries().ok().flatten().unwrap_or_default();
        entries.insert(self.key.clone(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(&Value::Object(entries))
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        fs::write(&self.path, body)?;
        tracing::debug!(path = %self.path.display(), "credential file written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("creds.json"), "access_token");
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_store_creates_parent_dirs_and_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/.studyfeed/creds.json");

        FileTokenStorage::new(&path, "access_token")
            .store("tok-123")
            .unwrap();

        let reopened = FileTokenStorage::new(&path, "access_token");
        assert_eq!(reopened.load().unwrap().as_deref(), Some("tok-123"));
    }

    #[test]
    fn test_store_preserves_foreign_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let storage = FileTokenStorage::new(&path, "access_token");
        storage.store("").unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(storage.load().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_corrupt_file_is_a_storage_error_but_can_be_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, "[1,2,3]").unwrap();

        let storage = FileTokenStorage::new(&path, "access_token");
        assert!(matches!(storage.load(), Err(DomainError::Storage(_))));

        storage.store("tok").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("tok"));
    }
}

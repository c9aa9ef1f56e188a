//! Local display-name cache.
//!
//! A student types their display name once; the next time they open a
//! room the cached name is used and the name form is skipped. The cache
//! holds exactly one value.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Where the display name survives between sessions.
///
/// Calls are synchronous: the value is a few bytes and is read once per
/// session and written at most once per join.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the store is shared (behind an `Arc`)
///   with the session driver's task.
pub trait NameStore: Send + Sync + 'static {
    /// The cached name, if one was saved.
    fn load(&self) -> Result<Option<String>, SessionError>;

    /// Replaces the cached name.
    fn save(&self, name: &str) -> Result<(), SessionError>;
}

/// Keeps the name in memory. For tests and short-lived clients.
#[derive(Debug, Default)]
pub struct MemoryNameStore {
    name: Mutex<Option<String>>,
}

impl MemoryNameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already remembers `name`.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Mutex::new(Some(name.into())),
        }
    }
}

impl NameStore for MemoryNameStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let guard = self
            .name
            .lock()
            .map_err(|_| SessionError::Persist("name store poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, name: &str) -> Result<(), SessionError> {
        let mut guard = self
            .name
            .lock()
            .map_err(|_| SessionError::Persist("name store poisoned".into()))?;
        *guard = Some(name.to_string());
        Ok(())
    }
}

/// On-disk shape of the name file.
#[derive(Debug, Serialize, Deserialize)]
struct NameFile {
    display_name: String,
}

/// Keeps the name in a small JSON file: `{"display_name": "Ada"}`.
///
/// A missing file means nothing is cached. A file that can't be parsed
/// is treated the same way (and logged), so a corrupt cache only costs
/// the student one trip through the name form.
#[derive(Debug, Clone)]
pub struct FileNameStore {
    path: PathBuf,
}

impl FileNameStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NameStore for FileNameStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Persist(e.to_string())),
        };
        match serde_json::from_slice::<NameFile>(&bytes) {
            Ok(file) => Ok(Some(file.display_name)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring unreadable name file"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, name: &str) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| SessionError::Persist(e.to_string()))?;
        }
        let json = serde_json::to_vec(&NameFile {
            display_name: name.to_string(),
        })
        .map_err(|e| SessionError::Persist(e.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|e| SessionError::Persist(e.to_string()))?;
        tracing::debug!(path = %self.path.display(), "display name saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(label: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("quizroom-names-{}-{label}", std::process::id()))
            .join("name.json")
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryNameStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save("Ada").unwrap();
        assert_eq!(store.load().unwrap(), Some("Ada".into()));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let store = FileNameStore::new(scratch_path("missing"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_save_creates_dirs_and_json() {
        let path = scratch_path("save");
        let store = FileNameStore::new(&path);

        store.save("Grace").unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"{"display_name":"Grace"}"#);
        assert_eq!(store.load().unwrap(), Some("Grace".into()));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_corrupt_file_is_ignored() {
        let path = scratch_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not json").unwrap();

        let store = FileNameStore::new(&path);

        assert_eq!(store.load().unwrap(), None);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}

//! Per-window state store.
//!
//! One JSON file per resolved window identity inside a runtime-scoped
//! directory; the file exists for exactly the maximized interval, and its
//! presence is the toggle state. There is no locking: two invocations
//! racing on the same identity can clobber each other's saved geometry
//! (acceptable for the single-user, single-hotkey usage this serves).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hyprvoice_core_toggle::{WindowIdentity, WindowState};
use tracing::{debug, warn};

/// Filesystem-backed key-value store for [`WindowState`] records.
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Store under the user's runtime directory
    /// (`$XDG_RUNTIME_DIR/hyprvoice`), falling back to the system temp dir.
    pub fn new() -> Self {
        let dir = directories::BaseDirs::new()
            .and_then(|d| d.runtime_dir().map(Path::to_path_buf))
            .unwrap_or_else(std::env::temp_dir)
            .join("hyprvoice");
        Self { dir }
    }

    /// Store rooted at an explicit directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, identity: &WindowIdentity) -> PathBuf {
        self.dir.join(format!("{identity}.json"))
    }

    /// Load the record for an identity.
    ///
    /// Absence is a valid outcome, not an error. A corrupt or unreadable
    /// record is logged and treated as absent, so the toggle degrades to
    /// re-maximizing instead of crashing.
    pub fn load(&self, identity: &WindowIdentity) -> Option<WindowState> {
        let path = self.record_path(identity);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("unreadable state record {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("corrupt state record {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write the record for an identity, fully replacing any prior one.
    pub fn save(&self, identity: &WindowIdentity, state: &WindowState) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.record_path(identity);
        let json = serde_json::to_string(state)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&path, json)?;
        debug!("saved state record {}", path.display());
        Ok(())
    }

    /// Remove the record for an identity. Removing a non-existent record
    /// is not an error.
    pub fn delete(&self, identity: &WindowIdentity) {
        let path = self.record_path(identity);
        match fs::remove_file(&path) {
            Ok(()) => debug!("deleted state record {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to delete state record {}: {}", path.display(), e),
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyprvoice_core_toggle::{resolve_identity, ActiveWindow};

    fn identity() -> WindowIdentity {
        resolve_identity(&ActiveWindow {
            address: "0xabc123".to_string(),
            ..Default::default()
        })
    }

    fn state() -> WindowState {
        WindowState {
            was_floating: true,
            x: 1,
            y: 2,
            w: 300,
            h: 400,
        }
    }

    #[test]
    fn test_load_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        assert_eq!(store.load(&identity()), None);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        store.save(&identity(), &state()).unwrap();
        assert_eq!(store.load(&identity()), Some(state()));
    }

    #[test]
    fn test_save_replaces_prior_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        store.save(&identity(), &state()).unwrap();

        let newer = WindowState {
            was_floating: false,
            x: 9,
            y: 9,
            w: 9,
            h: 9,
        };
        store.save(&identity(), &newer).unwrap();
        assert_eq!(store.load(&identity()), Some(newer));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        store.save(&identity(), &state()).unwrap();
        store.delete(&identity());
        assert_eq!(store.load(&identity()), None);
        store.delete(&identity()); // second delete must not blow up
    }

    #[test]
    fn test_corrupt_record_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path());
        store.save(&identity(), &state()).unwrap();

        let path = dir.path().join(format!("{}.json", identity()));
        std::fs::write(path, "{not json").unwrap();
        assert_eq!(store.load(&identity()), None);
    }

    #[test]
    fn test_store_creates_directory_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::at(dir.path().join("nested").join("run"));
        store.save(&identity(), &state()).unwrap();
        assert_eq!(store.load(&identity()), Some(state()));
    }
}

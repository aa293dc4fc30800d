//! JSON file persistence for the settings record.
//!
//! A single record per install, last-write-wins. Load never errors:
//! a missing or malformed file coerces to the documented defaults.

use std::path::{Path, PathBuf};

use tracing::warn;

use autonoindex_core::error::Result;
use autonoindex_core::settings::Settings;

/// File-backed store for the single settings record.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default store location under the user's home directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".autonoindex").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings record, coercing any problem to defaults.
    ///
    /// Partial records fill missing fields from defaults; an unreadable or
    /// unparsable file yields the full default record.
    pub fn load(&self) -> Settings {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Settings::default(),
        };

        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Settings file malformed, using defaults");
                Settings::default()
            }
        }
    }

    /// Persist the settings record, creating the parent directory if needed.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autonoindex_core::entitlement::ProStatus;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("settings.json"))
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let s = store.load();
        assert!(s.enabled);
        assert_eq!(s.entitlement.pro_status, ProStatus::Unknown);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut s = Settings::default();
        s.noindex_category = true;
        s.entitlement.pro_token = "tok-1".to_string();
        s.entitlement.pro_status = ProStatus::Active;
        store.save(&s).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, s);
    }

    #[test]
    fn malformed_file_coerces_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{broken").unwrap();
        let s = store.load();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn partial_record_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"noindex_search": false}"#).unwrap();
        let s = store.load();
        assert!(!s.noindex_search);
        assert!(s.noindex_author);
        assert!(s.force_apply);
    }
}

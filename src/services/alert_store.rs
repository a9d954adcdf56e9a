// Alert Storage Service
// JSON-file-backed ordered alert collection, most-recent-first

use std::fs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::models::AlertRecord;

const STORE_FILE: &str = "alertes.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to create store dir: {0}")]
    CreateDir(std::io::Error),
    #[error("failed to read alerts: {0}")]
    Read(std::io::Error),
    #[error("failed to write alerts: {0}")]
    Write(std::io::Error),
    #[error("failed to serialize alerts: {0}")]
    Serialize(#[from] serde_json::Error),
}

type Observer = Box<dyn Fn(&AlertRecord) + Send + Sync>;

pub struct AlertStore {
    store_dir: PathBuf,
    store_file: PathBuf,
    observers: Vec<Observer>,
}

impl AlertStore {
    pub fn new(store_dir: PathBuf) -> Self {
        let store_file = store_dir.join(STORE_FILE);
        Self {
            store_dir,
            store_file,
            observers: Vec::new(),
        }
    }

    /// Default store directory under the platform data dir.
    pub fn default_store_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|p| p.join("malaw-guard"))
    }

    /// Register a callback fired after each successful insertion. Delivery
    /// is best effort: a panicking observer is swallowed.
    pub fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.store_dir).map_err(StoreError::CreateDir)
    }

    /// Load the ordered collection. An absent file is an empty collection;
    /// a malformed file is logged and also treated as empty.
    pub fn load(&self) -> Result<Vec<AlertRecord>, StoreError> {
        if !self.store_file.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.store_file).map_err(StoreError::Read)?;
        match serde_json::from_str(&content) {
            Ok(alerts) => Ok(alerts),
            Err(e) => {
                warn!(
                    file = %self.store_file.display(),
                    error = %e,
                    "alert file is malformed, starting from an empty collection"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Prepend `record` unless an alert with the same description and
    /// category already exists. Returns whether the record was inserted.
    pub fn push(&self, record: &AlertRecord) -> Result<bool, StoreError> {
        let mut alerts = self.load()?;
        let duplicate = alerts
            .iter()
            .any(|a| a.description == record.description && a.category == record.category);
        if duplicate {
            return Ok(false);
        }

        alerts.insert(0, record.clone());
        self.write_all(&alerts)?;

        for observer in &self.observers {
            let _ = catch_unwind(AssertUnwindSafe(|| observer(record)));
        }
        Ok(true)
    }

    /// Drop every stored alert.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.write_all(&[])
    }

    /// Serialize the whole collection through a temp file, then rename over
    /// the store file so readers never see a partial write.
    fn write_all(&self, alerts: &[AlertRecord]) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(alerts)?;
        let tmp_file = self.store_dir.join(format!("{}.tmp", STORE_FILE));
        fs::write(&tmp_file, content).map_err(StoreError::Write)?;
        fs::rename(&tmp_file, &self.store_file).map_err(StoreError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn record(description: &str, category: &str) -> AlertRecord {
        AlertRecord::new(description, category, 80)
    }

    #[test]
    fn test_absent_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = AlertStore::new(dir.path().to_path_buf());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STORE_FILE), "not json {{{").unwrap();
        let store = AlertStore::new(dir.path().to_path_buf());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_push_prepends_most_recent_first() {
        let dir = TempDir::new().unwrap();
        let store = AlertStore::new(dir.path().to_path_buf());
        assert!(store.push(&record("premier", "Phishing")).unwrap());
        assert!(store.push(&record("deuxième", "Escroquerie")).unwrap());

        let alerts = store.load().unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].description, "deuxième");
        assert_eq!(alerts[1].description, "premier");
    }

    #[test]
    fn test_duplicate_description_category_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = AlertStore::new(dir.path().to_path_buf());
        assert!(store.push(&record("même texte", "Phishing")).unwrap());
        assert!(!store.push(&record("même texte", "Phishing")).unwrap());
        // Same text under another category is a distinct alert.
        assert!(store.push(&record("même texte", "Escroquerie")).unwrap());
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_observers_fire_on_insert_only() {
        let dir = TempDir::new().unwrap();
        let mut store = AlertStore::new(dir.path().to_path_buf());
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        store.subscribe(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        store.push(&record("alerte", "Phishing")).unwrap();
        store.push(&record("alerte", "Phishing")).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_observer_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let mut store = AlertStore::new(dir.path().to_path_buf());
        store.subscribe(Box::new(|_| panic!("observer bug")));
        assert!(store.push(&record("alerte", "Phishing")).unwrap());
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_clear_empties_collection() {
        let dir = TempDir::new().unwrap();
        let store = AlertStore::new(dir.path().to_path_buf());
        store.push(&record("alerte", "Phishing")).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}

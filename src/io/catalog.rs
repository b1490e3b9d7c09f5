//! Pump catalog storage.
//!
//! The selection engine only ever sees a snapshot (`Vec<PumpRecord>`) handed to it
//! by a `CatalogSource`; it never reaches for storage itself.
//!
//! `JsonCatalog` keeps the catalog as a pretty-printed JSON array. Writes go to a
//! sibling temp file that is renamed over the catalog, so concurrent readers see
//! either the old or the new file, never a partial one.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, info};

use crate::domain::PumpRecord;
use crate::error::AppError;

/// Environment variable naming the catalog file.
pub const CATALOG_ENV: &str = "PUMPSEL_CATALOG";

/// Catalog file used when neither a flag nor the environment names one.
pub const DEFAULT_CATALOG: &str = "pumps.json";

/// Timestamp format stored in `created_at` / `updated_at`.
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Read-only access to a catalog snapshot.
pub trait CatalogSource {
    fn snapshot(&self) -> Result<Vec<PumpRecord>, AppError>;
}

/// A catalog held in memory (tests, embedding).
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    pumps: Vec<PumpRecord>,
}

impl MemoryCatalog {
    pub fn new(pumps: Vec<PumpRecord>) -> Self {
        Self { pumps }
    }
}

impl CatalogSource for MemoryCatalog {
    fn snapshot(&self) -> Result<Vec<PumpRecord>, AppError> {
        Ok(self.pumps.clone())
    }
}

/// A catalog stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl CatalogSource for JsonCatalog {
    fn snapshot(&self) -> Result<Vec<PumpRecord>, AppError> {
        self.load()
    }
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the catalog path: explicit flag, then `PUMPSEL_CATALOG`, then the default.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::new(path);
        }
        match std::env::var(CATALOG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::new(path),
            _ => Self::new(DEFAULT_CATALOG),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records. A missing or blank file is an empty catalog.
    pub fn load(&self) -> Result<Vec<PumpRecord>, AppError> {
        if !self.path.exists() {
            debug!("Catalog '{}' does not exist yet; treating as empty.", self.path.display());
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| {
            AppError::new(2, format!("Failed to read catalog '{}': {e}", self.path.display()))
        })?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let pumps: Vec<PumpRecord> = serde_json::from_str(&text).map_err(|e| {
            AppError::new(2, format!("Invalid catalog JSON '{}': {e}", self.path.display()))
        })?;
        info!("Loaded {} pump(s) from '{}'", pumps.len(), self.path.display());
        Ok(pumps)
    }

    /// All records, newest id first.
    pub fn list(&self) -> Result<Vec<PumpRecord>, AppError> {
        let mut pumps = self.load()?;
        pumps.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(pumps)
    }

    pub fn get(&self, id: u64) -> Result<PumpRecord, AppError> {
        self.load()?
            .into_iter()
            .find(|p| p.id == Some(id))
            .ok_or_else(|| AppError::new(3, format!("Pump #{id} not found.")))
    }

    /// Insert a new record (no id) or replace an existing one (with id).
    ///
    /// Inserts get `max(id) + 1` and both timestamps; updates keep `created_at`.
    pub fn upsert(&self, mut record: PumpRecord) -> Result<PumpRecord, AppError> {
        let mut pumps = self.load()?;
        let now = Local::now().format(TIMESTAMP_FORMAT).to_string();

        match record.id {
            Some(id) => {
                let slot = pumps
                    .iter_mut()
                    .find(|p| p.id == Some(id))
                    .ok_or_else(|| AppError::new(3, format!("Pump #{id} not found.")))?;
                record.created_at = slot.created_at.clone();
                record.updated_at = Some(now);
                *slot = record.clone();
            }
            None => {
                let next_id = pumps.iter().filter_map(|p| p.id).max().unwrap_or(0) + 1;
                record.id = Some(next_id);
                record.created_at = Some(now.clone());
                record.updated_at = Some(now);
                pumps.push(record.clone());
            }
        }

        self.store(&pumps)?;
        info!("Saved pump {} to '{}'", record.label(), self.path.display());
        Ok(record)
    }

    pub fn delete(&self, id: u64) -> Result<PumpRecord, AppError> {
        let mut pumps = self.load()?;
        let idx = pumps
            .iter()
            .position(|p| p.id == Some(id))
            .ok_or_else(|| AppError::new(3, format!("Pump #{id} not found.")))?;
        let removed = pumps.remove(idx);
        self.store(&pumps)?;
        info!("Deleted pump {} from '{}'", removed.label(), self.path.display());
        Ok(removed)
    }

    fn store(&self, pumps: &[PumpRecord]) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(pumps)
            .map_err(|e| AppError::new(4, format!("Failed to encode catalog: {e}")))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)
            .map_err(|e| AppError::new(4, format!("Failed to write catalog '{}': {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::new(4, format!("Failed to replace catalog '{}': {e}", self.path.display()))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str) -> PumpRecord {
        PumpRecord {
            name: name.to_string(),
            h_coeffs: Some("[0, 0, -0.01, 50]".to_string()),
            q_max: 100.0,
            ..PumpRecord::default()
        }
    }

    #[test]
    fn missing_file_is_an_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let catalog = JsonCatalog::new(dir.path().join("pumps.json"));
        assert!(catalog.snapshot().unwrap().is_empty());
    }

    #[test]
    fn upsert_assigns_ids_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let catalog = JsonCatalog::new(dir.path().join("pumps.json"));

        let a = catalog.upsert(record("A")).unwrap();
        let b = catalog.upsert(record("B")).unwrap();
        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert!(a.created_at.is_some());

        let listed = catalog.list().unwrap();
        assert_eq!(listed.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), ["B", "A"]);
        assert_eq!(catalog.get(1).unwrap(), a);
    }

    #[test]
    fn update_keeps_creation_time() {
        let dir = TempDir::new().unwrap();
        let catalog = JsonCatalog::new(dir.path().join("pumps.json"));
        let saved = catalog.upsert(record("A")).unwrap();

        let mut edited = saved.clone();
        edited.name = "A-rev".to_string();
        edited.created_at = None;
        let updated = catalog.upsert(edited).unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.created_at, saved.created_at);
        assert_eq!(catalog.load().unwrap().len(), 1);
        assert_eq!(catalog.get(1).unwrap().name, "A-rev");
    }

    #[test]
    fn unknown_ids_are_errors() {
        let dir = TempDir::new().unwrap();
        let catalog = JsonCatalog::new(dir.path().join("pumps.json"));
        let mut ghost = record("ghost");
        ghost.id = Some(42);
        assert_eq!(catalog.upsert(ghost).unwrap_err().exit_code(), 3);
        assert_eq!(catalog.delete(42).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn delete_removes_the_record() {
        let dir = TempDir::new().unwrap();
        let catalog = JsonCatalog::new(dir.path().join("pumps.json"));
        catalog.upsert(record("A")).unwrap();
        catalog.upsert(record("B")).unwrap();

        let removed = catalog.delete(1).unwrap();
        assert_eq!(removed.name, "A");
        let left = catalog.load().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, Some(2));
    }

    #[test]
    fn rewrites_keep_fields_of_untouched_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pumps.json");
        fs::write(
            &path,
            r#"[
                {"id": 1, "name": "Kept", "executor": "Ivanov", "price": 1200.0, "currency": "EUR", "impeller_actual": "210"},
                {"id": 2, "name": "Gone"}
            ]"#,
        )
        .unwrap();
        let catalog = JsonCatalog::new(&path);
        catalog.delete(2).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"impeller_actual\": \"210\""));
        let left = catalog.load().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].executor.as_deref(), Some("Ivanov"));
        assert_eq!(left[0].price, 1200.0);
        assert_eq!(left[0].currency.as_deref(), Some("EUR"));
        assert_eq!(left[0].impeller.as_deref(), Some("210"));
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pumps.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonCatalog::new(&path).load().unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn legacy_delimited_coefficients_load_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pumps.json");
        fs::write(&path, r#"[{"id": 5, "name": "Old", "h_coeffs": "0 0 -0.01 50", "q_max": 60}]"#).unwrap();
        let pumps = JsonCatalog::new(&path).snapshot().unwrap();
        assert_eq!(pumps[0].h_coeffs.as_deref(), Some("0 0 -0.01 50"));
    }
}

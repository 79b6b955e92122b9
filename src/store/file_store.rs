//! store::file_store
//!
//! File-based store.
//!
//! # Storage
//!
//! - `<data_dir>/races.json` holds the whole [`Document`]
//! - `<data_dir>/lock` is locked exclusively while the store is open
//!
//! # Atomicity
//!
//! Every mutation is applied to a copy of the document, the copy is written
//! to a temp file and renamed over `races.json`, and only then does the
//! in-memory document change. A failed operation leaves both the file and
//! the open store as they were.
//!
//! # Example
//!
//! ```no_run
//! use racekeeper::core::paths::DataPaths;
//! use racekeeper::store::{FileStore, StudentDirectory};
//! use racekeeper::core::types::Name;
//! use std::path::PathBuf;
//!
//! let store = FileStore::open(&DataPaths::new(PathBuf::from("/srv/races"))).unwrap();
//! store.add_student(Name::new("Ada").unwrap()).unwrap();
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::document::Document;
use super::lock::StoreLock;
use super::traits::{RaceStore, StoreError, StudentDirectory};
use crate::core::model::{Race, Student};
use crate::core::paths::DataPaths;
use crate::core::types::{LaneId, Name, RaceId, StudentId};

/// A store persisted as one JSON file in a data directory.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    doc: Mutex<Document>,
    _lock: StoreLock,
}

impl FileStore {
    /// Lock the data directory and load its document.
    ///
    /// A missing `races.json` yields an empty store; the file is created on
    /// the first write.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Lock`] if the directory is locked by another handle
    /// - [`StoreError::Corrupt`] if the document fails its integrity check
    pub fn open(paths: &DataPaths) -> Result<Self, StoreError> {
        let lock = StoreLock::acquire(paths)?;
        let path = paths.database_path();
        let doc = Self::read_document(&path)?;
        debug!(
            path = %path.display(),
            races = doc.races.len(),
            students = doc.students.len(),
            "opened store"
        );
        Ok(Self {
            path,
            doc: Mutex::new(doc),
            _lock: lock,
        })
    }

    /// Path of the JSON document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(path: &Path) -> Result<Document, StoreError> {
        if !path.exists() {
            return Ok(Document::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::ReadError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Document::parse(&content, &path.display().to_string())
    }

    fn write_document(&self, doc: &Document) -> Result<(), StoreError> {
        let content = doc.to_json()?;
        let temp_path = self.path.with_extension("json.tmp");

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| StoreError::WriteError(format!("cannot create temp file: {}", e)))?;
            file.write_all(content.as_bytes())
                .map_err(|e| StoreError::WriteError(format!("cannot write temp file: {}", e)))?;
            file.sync_all()
                .map_err(|e| StoreError::WriteError(format!("cannot sync temp file: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StoreError::WriteError(format!("cannot replace {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }

    fn doc(&self) -> Result<MutexGuard<'_, Document>, StoreError> {
        self.doc
            .lock()
            .map_err(|_| StoreError::ReadError("store mutex poisoned".to_string()))
    }

    /// Apply `f` to a copy of the document, persist it, then commit.
    fn update<T>(
        &self,
        f: impl FnOnce(&mut Document) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.doc()?;
        let mut next = guard.clone();
        let value = f(&mut next)?;
        self.write_document(&next)?;
        *guard = next;
        Ok(value)
    }
}

impl RaceStore for FileStore {
    fn allocate_race_id(&self) -> Result<RaceId, StoreError> {
        self.update(|doc| Ok(doc.allocate_race_id()))
    }

    fn allocate_lane_id(&self) -> Result<LaneId, StoreError> {
        self.update(|doc| Ok(doc.allocate_lane_id()))
    }

    fn load_race(&self, id: RaceId) -> Result<Race, StoreError> {
        self.doc()?.load_race(id)
    }

    fn save_race(&self, race: &Race) -> Result<(), StoreError> {
        self.update(|doc| doc.save_race(race))?;
        debug!(race = %race.id, lanes = race.lanes.len(), "saved race");
        Ok(())
    }

    fn delete_race(&self, id: RaceId) -> Result<(), StoreError> {
        self.update(|doc| doc.delete_race(id))
    }

    fn list_races(&self) -> Result<Vec<Race>, StoreError> {
        Ok(self.doc()?.races.clone())
    }
}

impl StudentDirectory for FileStore {
    fn add_student(&self, name: Name) -> Result<Student, StoreError> {
        self.update(|doc| Ok(doc.add_student(name)))
    }

    fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self.doc()?.find_student(id))
    }

    fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.doc()?.students.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::lock::LockError;
    use tempfile::TempDir;

    fn paths(temp: &TempDir) -> DataPaths {
        DataPaths::new(temp.path().to_path_buf())
    }

    #[test]
    fn empty_directory_opens_empty() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(&paths(&temp)).unwrap();
        assert!(store.list_races().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn writes_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let student = {
            let store = FileStore::open(&paths(&temp)).unwrap();
            store.add_student(Name::new("Ada").unwrap()).unwrap()
        };

        let store = FileStore::open(&paths(&temp)).unwrap();
        assert_eq!(store.list_students().unwrap(), vec![student]);
    }

    #[test]
    fn allocated_ids_committed_without_save() {
        let temp = TempDir::new().unwrap();
        let first = {
            let store = FileStore::open(&paths(&temp)).unwrap();
            let race = store.allocate_race_id().unwrap();
            let lane = store.allocate_lane_id().unwrap();
            (race, lane)
        };

        let store = FileStore::open(&paths(&temp)).unwrap();
        assert!(store.list_races().unwrap().is_empty());
        assert_eq!(store.allocate_race_id().unwrap(), RaceId::new(first.0.get() + 1));
        assert_eq!(store.allocate_lane_id().unwrap(), LaneId::new(first.1.get() + 1));
    }

    #[test]
    fn second_open_is_locked_out() {
        let temp = TempDir::new().unwrap();
        let _store = FileStore::open(&paths(&temp)).unwrap();
        let err = FileStore::open(&paths(&temp)).unwrap_err();
        assert!(matches!(err, StoreError::Lock(LockError::AlreadyLocked)));
    }

    #[test]
    fn failed_save_leaves_file_unchanged() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(&paths(&temp)).unwrap();
        store.add_student(Name::new("Ada").unwrap()).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let ghost = Race::new(RaceId::new(77), Name::new("Ghost").unwrap());
        assert!(store.save_race(&ghost).is_err());

        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
        assert!(store.list_races().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("races.json"), "{ not json").unwrap();
        let err = FileStore::open(&paths(&temp)).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(&paths(&temp)).unwrap();
        store.allocate_race_id().unwrap();
        assert!(!temp.path().join("races.json.tmp").exists());
    }
}

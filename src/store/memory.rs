//! store::memory
//!
//! In-memory store. Nothing is persisted; used by tests and embedders
//! that manage persistence themselves.

use std::sync::{Mutex, MutexGuard};

use super::document::Document;
use super::traits::{RaceStore, StoreError, StudentDirectory};
use crate::core::model::{Race, Student};
use crate::core::types::{LaneId, Name, RaceId, StudentId};

/// A store backed by a [`Document`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document.
    pub fn with_document(doc: Document) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }

    /// Copy of the current document.
    pub fn snapshot(&self) -> Result<Document, StoreError> {
        Ok(self.doc()?.clone())
    }

    fn doc(&self) -> Result<MutexGuard<'_, Document>, StoreError> {
        self.doc
            .lock()
            .map_err(|_| StoreError::ReadError("store mutex poisoned".to_string()))
    }
}

impl RaceStore for MemoryStore {
    fn allocate_race_id(&self) -> Result<RaceId, StoreError> {
        Ok(self.doc()?.allocate_race_id())
    }

    fn allocate_lane_id(&self) -> Result<LaneId, StoreError> {
        Ok(self.doc()?.allocate_lane_id())
    }

    fn load_race(&self, id: RaceId) -> Result<Race, StoreError> {
        self.doc()?.load_race(id)
    }

    fn save_race(&self, race: &Race) -> Result<(), StoreError> {
        self.doc()?.save_race(race)
    }

    fn delete_race(&self, id: RaceId) -> Result<(), StoreError> {
        self.doc()?.delete_race(id)
    }

    fn list_races(&self) -> Result<Vec<Race>, StoreError> {
        Ok(self.doc()?.races.clone())
    }
}

impl StudentDirectory for MemoryStore {
    fn add_student(&self, name: Name) -> Result<Student, StoreError> {
        Ok(self.doc()?.add_student(name))
    }

    fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self.doc()?.find_student(id))
    }

    fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.doc()?.students.clone())
    }
}

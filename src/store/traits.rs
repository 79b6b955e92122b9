//! store::traits
//!
//! Persistence traits consumed by the engine.
//!
//! # Design
//!
//! A race is stored as one aggregate: the race row together with its lanes.
//! [`RaceStore::save_race`] replaces the whole aggregate at once, so an
//! operation either persists completely or not at all.
//!
//! Implementations MUST:
//! - Reject a save that would break per-race uniqueness with
//!   [`StoreError::Conflict`]
//! - Never reuse an identifier, also after deletion
//! - Be thread-safe (Send + Sync)

use thiserror::Error;

use super::lock::LockError;
use crate::core::errors::{Entity, RaceError};
use crate::core::model::{Race, Student};
use crate::core::types::{LaneId, Name, RaceId, StudentId};

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No race with this id.
    #[error("race {0} not found")]
    RaceNotFound(RaceId),

    /// A save would break a uniqueness constraint.
    #[error("{0}")]
    Conflict(String),

    /// A record references data that does not exist.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// The stored document is unreadable or inconsistent.
    #[error("corrupt data file '{path}': {message}")]
    Corrupt { path: String, message: String },

    /// Failed to read from storage.
    #[error("failed to read data: {0}")]
    ReadError(String),

    /// Failed to write to storage.
    #[error("failed to write data: {0}")]
    WriteError(String),

    /// The data directory could not be locked.
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Storage for race aggregates.
pub trait RaceStore: Send + Sync {
    /// Reserve a fresh race id.
    fn allocate_race_id(&self) -> Result<RaceId, StoreError>;

    /// Reserve a fresh lane id.
    fn allocate_lane_id(&self) -> Result<LaneId, StoreError>;

    /// Load a race with all of its lanes.
    ///
    /// Returns [`StoreError::RaceNotFound`] if the race does not exist.
    fn load_race(&self, id: RaceId) -> Result<Race, StoreError>;

    /// Insert or replace a race aggregate.
    fn save_race(&self, race: &Race) -> Result<(), StoreError>;

    /// Delete a race and its lanes.
    fn delete_race(&self, id: RaceId) -> Result<(), StoreError>;

    /// All races ordered by id.
    fn list_races(&self) -> Result<Vec<Race>, StoreError>;
}

/// The student directory.
pub trait StudentDirectory: Send + Sync {
    /// Add a student with a freshly allocated id.
    fn add_student(&self, name: Name) -> Result<Student, StoreError>;

    /// Look up a student.
    ///
    /// Returns `Ok(None)` if no such student exists.
    fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError>;

    /// All students ordered by id.
    fn list_students(&self) -> Result<Vec<Student>, StoreError>;
}

impl From<StoreError> for RaceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(message) => RaceError::DuplicateRegistration(message),
            StoreError::RaceNotFound(id) => RaceError::not_found(Entity::Race, id.get()),
            other => RaceError::Storage(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;

    #[test]
    fn conflict_is_duplicate_registration() {
        let err: RaceError = StoreError::Conflict("lane 1 can only have one student".into()).into();
        assert_eq!(err.kind(), ErrorKind::DuplicateRegistration);
    }

    #[test]
    fn missing_race_is_not_found() {
        let err: RaceError = StoreError::RaceNotFound(RaceId::new(9)).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "race 9 not found");
    }

    #[test]
    fn write_failure_is_storage() {
        let err: RaceError = StoreError::WriteError("cannot sync temp file".into()).into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().starts_with("storage error:"));
    }
}

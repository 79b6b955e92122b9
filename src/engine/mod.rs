//! engine
//!
//! The operation boundary: Load -> Apply -> Verify -> Save.
//!
//! # Architecture
//!
//! Every mutating operation follows the same shape:
//!
//! 1. **Load**: read the race aggregate from the store
//! 2. **Apply**: run one [`RaceLifecycle`] operation on the in-memory copy
//! 3. **Verify**: the store re-checks uniqueness on save
//! 4. **Save**: persist the aggregate in a single write
//!
//! A failure at any step returns before the save, so the stored race is
//! never partially updated.
//!
//! # Invariants
//!
//! - The engine owns no business rules; those live in `core`
//! - Each operation saves the race aggregate at most once. Id allocation
//!   is committed on its own beforehand, so a rejected save can leave a
//!   gap in the ids but never reuses one
//! - A missing race or student is always `NotFound`, never created
//!
//! # Example
//!
//! ```
//! use racekeeper::core::lifecycle::{LifecycleConfig, Placement};
//! use racekeeper::engine::Engine;
//! use racekeeper::store::MemoryStore;
//!
//! let engine = Engine::new(MemoryStore::new(), LifecycleConfig::default());
//! let race = engine.create_race("100m Sprint").unwrap();
//! let ada = engine.register_student("Ada").unwrap();
//! let bo = engine.register_student("Bo").unwrap();
//!
//! let a = engine.assign_student_to_lane(race.id, ada.id).unwrap();
//! let b = engine.assign_student_to_lane(race.id, bo.id).unwrap();
//! engine.lock_race(race.id).unwrap();
//!
//! let done = engine
//!     .record_results(race.id, &[Placement::new(b.id, 1), Placement::new(a.id, 2)])
//!     .unwrap();
//! assert_eq!(done.standings()[0].id, b.id);
//! ```

use tracing::{debug, info};

use crate::core::errors::{Entity, RaceError};
use crate::core::lanes;
use crate::core::lifecycle::{LifecycleConfig, Placement, RaceLifecycle};
use crate::core::model::{Lane, Race, Student};
use crate::core::ranking::ValidationMode;
use crate::core::types::{LaneNumber, Name, RaceId, StudentId};
use crate::core::verify::{self, VerifyResult};
use crate::store::Store;

/// Runs race operations against a store.
#[derive(Debug)]
pub struct Engine<S> {
    store: S,
    lifecycle: RaceLifecycle,
}

impl<S: Store> Engine<S> {
    pub fn new(store: S, config: LifecycleConfig) -> Self {
        Self {
            store,
            lifecycle: RaceLifecycle::new(config),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn lifecycle(&self) -> &RaceLifecycle {
        &self.lifecycle
    }

    // =========================================================================
    // Students
    // =========================================================================

    /// Add a student to the directory.
    pub fn register_student(&self, name: &str) -> Result<Student, RaceError> {
        let student = Name::new(name)
            .map_err(RaceError::from)
            .and_then(|name| self.store.add_student(name).map_err(RaceError::from))
            .map_err(|e| rejected("register_student", e))?;
        info!(student = %student.id, name = %student.name, "student added");
        Ok(student)
    }

    pub fn list_students(&self) -> Result<Vec<Student>, RaceError> {
        Ok(self.store.list_students()?)
    }

    fn student(&self, id: StudentId) -> Result<Student, RaceError> {
        self.store
            .find_student(id)?
            .ok_or_else(|| RaceError::not_found(Entity::Student, id.get()))
    }

    // =========================================================================
    // Races
    // =========================================================================

    /// Create an empty race in the `Open` state.
    ///
    /// The name is checked before an id is allocated.
    pub fn create_race(&self, name: &str) -> Result<Race, RaceError> {
        self.try_create_race(name)
            .map_err(|e| rejected("create_race", e))
    }

    fn try_create_race(&self, name: &str) -> Result<Race, RaceError> {
        let name = Name::new(name)?;
        let id = self.store.allocate_race_id()?;
        let race = self.lifecycle.create(id, name.as_str())?;
        self.store.save_race(&race)?;
        Ok(race)
    }

    /// Load a race with its lanes.
    pub fn race(&self, id: RaceId) -> Result<Race, RaceError> {
        Ok(self.store.load_race(id)?)
    }

    pub fn list_races(&self) -> Result<Vec<Race>, RaceError> {
        Ok(self.store.list_races()?)
    }

    /// Run the full invariant check on a stored race.
    ///
    /// Incremental validation can finalize a race whose places are not a
    /// competition ranking as a whole; this is where that shows up.
    pub fn verify_race(&self, id: RaceId) -> Result<VerifyResult, RaceError> {
        let race = self.store.load_race(id)?;
        Ok(verify::full_verify(&race))
    }

    /// Delete a race and all of its lanes.
    pub fn delete_race(&self, id: RaceId) -> Result<(), RaceError> {
        self.store
            .delete_race(id)
            .map_err(|e| rejected("delete_race", e.into()))?;
        info!(race = %id, "race deleted");
        Ok(())
    }

    // =========================================================================
    // Lanes
    // =========================================================================

    /// Register a student in the next lane of a race.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the race or the student does not exist
    /// - `InvalidState` if the race is no longer open
    /// - `DuplicateRegistration` if the student already has a lane
    pub fn assign_student_to_lane(
        &self,
        race_id: RaceId,
        student_id: StudentId,
    ) -> Result<Lane, RaceError> {
        self.try_assign(race_id, student_id)
            .map_err(|e| rejected("assign_student_to_lane", e))
    }

    fn try_assign(&self, race_id: RaceId, student_id: StudentId) -> Result<Lane, RaceError> {
        let mut race = self.store.load_race(race_id)?;
        let student = self.student(student_id)?;

        // Allocate only once the registration is known to succeed.
        lanes::check_assignable(&race, &student)?;
        let lane_id = self.store.allocate_lane_id()?;

        let lane = self.lifecycle.register(&mut race, &student, lane_id)?.clone();
        self.store.save_race(&race)?;
        Ok(lane)
    }

    /// Students without a lane in the race, ordered by name.
    pub fn available_students(&self, race_id: RaceId) -> Result<Vec<Student>, RaceError> {
        let race = self.store.load_race(race_id)?;
        let directory = self.store.list_students()?;
        Ok(lanes::available_students(&race, &directory))
    }

    /// The lane number the next registration would receive.
    pub fn next_lane_number(&self, race_id: RaceId) -> Result<LaneNumber, RaceError> {
        let race = self.store.load_race(race_id)?;
        Ok(lanes::next_lane_number(&race))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Close registration for a race.
    pub fn lock_race(&self, race_id: RaceId) -> Result<Race, RaceError> {
        self.mutate("lock_race", race_id, |lifecycle, race| lifecycle.lock(race))
    }

    /// Record places using the configured validation mode.
    pub fn record_results(
        &self,
        race_id: RaceId,
        placements: &[Placement],
    ) -> Result<Race, RaceError> {
        let mode = self.lifecycle.config().validation_mode;
        self.record_results_with_mode(race_id, placements, mode)
    }

    /// Record places, validating the batch with `mode`.
    pub fn record_results_with_mode(
        &self,
        race_id: RaceId,
        placements: &[Placement],
        mode: ValidationMode,
    ) -> Result<Race, RaceError> {
        self.mutate("record_results", race_id, |lifecycle, race| {
            lifecycle.record_results_with_mode(race, placements, mode)
        })
    }

    /// Load, apply `f`, save. Nothing is saved if `f` fails.
    fn mutate(
        &self,
        op: &'static str,
        race_id: RaceId,
        f: impl FnOnce(&RaceLifecycle, &mut Race) -> Result<(), RaceError>,
    ) -> Result<Race, RaceError> {
        let apply = || -> Result<Race, RaceError> {
            let mut race = self.store.load_race(race_id)?;
            f(&self.lifecycle, &mut race)?;
            self.store.save_race(&race)?;
            Ok(race)
        };
        apply().map_err(|e| rejected(op, e))
    }
}

fn rejected(op: &'static str, err: RaceError) -> RaceError {
    debug!(op, kind = ?err.kind(), error = %err, "operation rejected");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use crate::core::types::{LaneId, RaceStatus};
    use crate::store::{MemoryStore, RaceStore};

    fn engine() -> Engine<MemoryStore> {
        Engine::new(MemoryStore::new(), LifecycleConfig::default())
    }

    fn race_with(engine: &Engine<MemoryStore>, students: &[&str]) -> (Race, Vec<Lane>) {
        let race = engine.create_race("200m sprint").unwrap();
        let lanes = students
            .iter()
            .map(|name| {
                let s = engine.register_student(name).unwrap();
                engine.assign_student_to_lane(race.id, s.id).unwrap()
            })
            .collect();
        (race, lanes)
    }

    #[test]
    fn blank_race_name_allocates_nothing() {
        let engine = engine();
        assert_eq!(
            engine.create_race("  ").unwrap_err().kind(),
            ErrorKind::Validation
        );
        let race = engine.create_race("Relay").unwrap();
        assert_eq!(race.id, RaceId::new(1));
    }

    #[test]
    fn unknown_race_is_not_found() {
        let engine = engine();
        let err = engine.lock_race(RaceId::new(3)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "race 3 not found");
    }

    #[test]
    fn unknown_student_is_not_found() {
        let engine = engine();
        let race = engine.create_race("Relay").unwrap();
        let err = engine
            .assign_student_to_lane(race.id, StudentId::new(8))
            .unwrap_err();
        assert_eq!(err.to_string(), "student 8 not found");
    }

    #[test]
    fn registration_is_persisted() {
        let engine = engine();
        let (race, lanes) = race_with(&engine, &["Rosa", "George"]);
        let stored = engine.race(race.id).unwrap();
        assert_eq!(stored.lanes, lanes);
        assert_eq!(engine.next_lane_number(race.id).unwrap().get(), 3);
    }

    #[test]
    fn failed_registration_wastes_no_lane_id() {
        let engine = engine();
        let (race, lanes) = race_with(&engine, &["Rosa"]);
        let rosa = lanes[0].student_id;
        assert!(engine.assign_student_to_lane(race.id, rosa).is_err());

        let eva = engine.register_student("Eva").unwrap();
        let lane = engine.assign_student_to_lane(race.id, eva.id).unwrap();
        assert_eq!(lane.id, LaneId::new(2));
    }

    #[test]
    fn failed_results_leave_store_untouched() {
        let engine = engine();
        let (race, lanes) = race_with(&engine, &["Rosa", "George", "Eva", "Sam"]);
        engine.lock_race(race.id).unwrap();
        let before = engine.race(race.id).unwrap();

        let batch: Vec<Placement> = lanes
            .iter()
            .zip([1, 2, 3, 6])
            .map(|(l, p)| Placement::new(l.id, p))
            .collect();
        let err = engine.record_results(race.id, &batch).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Ranking);
        assert_eq!(engine.race(race.id).unwrap(), before);
    }

    #[test]
    fn full_flow_finalizes() {
        let engine = engine();
        let (race, lanes) = race_with(&engine, &["Rosa", "George", "Eva"]);
        engine.lock_race(race.id).unwrap();

        let done = engine
            .record_results(
                race.id,
                &[
                    Placement::new(lanes[0].id, 1),
                    Placement::new(lanes[1].id, 1),
                    Placement::new(lanes[2].id, 3),
                ],
            )
            .unwrap();
        assert_eq!(done.status, RaceStatus::Finalized);
        assert_eq!(engine.race(race.id).unwrap().status, RaceStatus::Finalized);
    }

    #[test]
    fn available_excludes_registered() {
        let engine = engine();
        let (race, _) = race_with(&engine, &["Rosa"]);
        engine.register_student("Adam").unwrap();
        let names: Vec<String> = engine
            .available_students(race.id)
            .unwrap()
            .iter()
            .map(|s| s.name.to_string())
            .collect();
        assert_eq!(names, vec!["Adam"]);
    }

    #[test]
    fn incremental_results_can_fail_full_verify() {
        let engine = engine();
        let (race, lanes) = race_with(&engine, &["Rosa", "George", "Eva", "Sam"]);
        let batch: Vec<Placement> = lanes
            .iter()
            .zip([1, 2, 3, 4])
            .map(|(l, p)| Placement::new(l.id, p))
            .collect();
        engine.record_results(race.id, &batch).unwrap();
        assert!(engine.verify_race(race.id).unwrap().ok);

        // Lane 4 moves to a tie for second: valid against the others at the
        // time, but third place is now a gap.
        engine
            .record_results(race.id, &[Placement::new(lanes[3].id, 2)])
            .unwrap();
        let result = engine.verify_race(race.id).unwrap();
        assert!(!result.ok);
    }

    #[test]
    fn delete_cascades_and_is_terminal() {
        let engine = engine();
        let (race, _) = race_with(&engine, &["Rosa"]);
        engine.delete_race(race.id).unwrap();
        assert!(engine.store().list_races().unwrap().is_empty());
        assert_eq!(
            engine.delete_race(race.id).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}

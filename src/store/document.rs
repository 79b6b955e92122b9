//! store::document
//!
//! The persisted data document (v1).
//!
//! # Schema Design
//!
//! One JSON document holds every student and race:
//! - Self-describing with `kind` and `schema_version`
//! - Strictly parsed (unknown fields rejected)
//! - Identifier counters live in `next_ids` so ids are never reused
//!
//! ```json
//! {
//!   "kind": "racekeeper.data",
//!   "schema_version": 1,
//!   "next_ids": { "race": 2, "lane": 3, "student": 3 },
//!   "students": [{ "id": 1, "name": "Ada" }],
//!   "races": [{ "id": 1, "name": "100m", "status": "OPEN", "lanes": [] }]
//! }
//! ```
//!
//! Both store implementations keep a [`Document`] in memory and differ only
//! in whether it is written to disk.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::traits::StoreError;
use crate::core::model::{Race, Student};
use crate::core::types::{LaneId, Name, RaceId, StudentId};
use crate::core::verify;

/// The kind identifier for data documents.
pub const DOCUMENT_KIND: &str = "racekeeper.data";

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Next identifier to hand out per entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NextIds {
    pub race: u64,
    pub lane: u64,
    pub student: u64,
}

impl Default for NextIds {
    fn default() -> Self {
        Self {
            race: 1,
            lane: 1,
            student: 1,
        }
    }
}

/// Envelope read before the full document to check the version.
#[derive(Debug, Deserialize)]
struct Envelope {
    kind: String,
    schema_version: u32,
}

/// Students, races and id counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    pub kind: String,
    pub schema_version: u32,
    #[serde(default)]
    pub next_ids: NextIds,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub races: Vec<Race>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            kind: DOCUMENT_KIND.to_string(),
            schema_version: SCHEMA_VERSION,
            next_ids: NextIds::default(),
            students: Vec::new(),
            races: Vec::new(),
        }
    }
}

impl Document {
    /// Parse and check a document.
    ///
    /// `origin` names the source in error messages.
    pub fn parse(json: &str, origin: &str) -> Result<Self, StoreError> {
        let corrupt = |message: String| StoreError::Corrupt {
            path: origin.to_string(),
            message,
        };

        let envelope: Envelope =
            serde_json::from_str(json).map_err(|e| corrupt(e.to_string()))?;
        if envelope.kind != DOCUMENT_KIND {
            return Err(corrupt(format!(
                "invalid kind '{}', expected '{}'",
                envelope.kind, DOCUMENT_KIND
            )));
        }
        if envelope.schema_version != SCHEMA_VERSION {
            return Err(corrupt(format!(
                "unsupported schema version {}, supported: {}",
                envelope.schema_version, SCHEMA_VERSION
            )));
        }

        let doc: Document = serde_json::from_str(json).map_err(|e| corrupt(e.to_string()))?;
        doc.check().map_err(corrupt)?;
        Ok(doc)
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::WriteError(e.to_string()))
    }

    /// Referential integrity and counter consistency.
    fn check(&self) -> Result<(), String> {
        let mut student_ids = HashSet::new();
        for student in &self.students {
            if !student_ids.insert(student.id) {
                return Err(format!("student {} appears more than once", student.id));
            }
            if student.id.get() >= self.next_ids.student {
                return Err(format!("student {} is ahead of the id counter", student.id));
            }
        }

        let mut race_ids = HashSet::new();
        let mut lane_ids = HashSet::new();
        for race in &self.races {
            if !race_ids.insert(race.id) {
                return Err(format!("race {} appears more than once", race.id));
            }
            if race.id.get() >= self.next_ids.race {
                return Err(format!("race {} is ahead of the id counter", race.id));
            }

            let result = verify::fast_verify(race);
            if let Some(error) = result.errors.first() {
                return Err(format!("race {}: {}", race.id, error));
            }

            for lane in &race.lanes {
                if !student_ids.contains(&lane.student_id) {
                    return Err(format!(
                        "lane {} references unknown student {}",
                        lane.id, lane.student_id
                    ));
                }
                if !lane_ids.insert(lane.id) {
                    return Err(format!("lane {} appears more than once", lane.id));
                }
                if lane.id.get() >= self.next_ids.lane {
                    return Err(format!("lane {} is ahead of the id counter", lane.id));
                }
            }
        }

        Ok(())
    }

    // =========================================================================
    // Races
    // =========================================================================

    pub fn allocate_race_id(&mut self) -> RaceId {
        let id = RaceId::new(self.next_ids.race);
        self.next_ids.race += 1;
        id
    }

    pub fn allocate_lane_id(&mut self) -> LaneId {
        let id = LaneId::new(self.next_ids.lane);
        self.next_ids.lane += 1;
        id
    }

    pub fn load_race(&self, id: RaceId) -> Result<Race, StoreError> {
        self.races
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::RaceNotFound(id))
    }

    /// Insert or replace `race` after checking it against the rest of the
    /// document.
    pub fn save_race(&mut self, race: &Race) -> Result<(), StoreError> {
        let result = verify::fast_verify(race);
        if let Some(error) = result.errors.first() {
            return Err(StoreError::Conflict(error.to_string()));
        }

        for lane in &race.lanes {
            if !self.students.iter().any(|s| s.id == lane.student_id) {
                return Err(StoreError::Integrity(format!(
                    "lane {} references unknown student {}",
                    lane.id, lane.student_id
                )));
            }
            let taken = self
                .races
                .iter()
                .filter(|r| r.id != race.id)
                .any(|r| r.lane(lane.id).is_some());
            if taken {
                return Err(StoreError::Integrity(format!(
                    "lane {} belongs to another race",
                    lane.id
                )));
            }
        }

        if race.id.get() >= self.next_ids.race {
            return Err(StoreError::Integrity(format!(
                "race {} was not allocated by this store",
                race.id
            )));
        }

        match self.races.iter_mut().find(|r| r.id == race.id) {
            Some(existing) => *existing = race.clone(),
            None => {
                self.races.push(race.clone());
                self.races.sort_by_key(|r| r.id);
            }
        }
        Ok(())
    }

    pub fn delete_race(&mut self, id: RaceId) -> Result<(), StoreError> {
        let before = self.races.len();
        self.races.retain(|r| r.id != id);
        if self.races.len() == before {
            return Err(StoreError::RaceNotFound(id));
        }
        Ok(())
    }

    // =========================================================================
    // Students
    // =========================================================================

    pub fn add_student(&mut self, name: Name) -> Student {
        let student = Student::new(StudentId::new(self.next_ids.student), name);
        self.next_ids.student += 1;
        self.students.push(student.clone());
        student
    }

    pub fn find_student(&self, id: StudentId) -> Option<Student> {
        self.students.iter().find(|s| s.id == id).cloned()
    }
}

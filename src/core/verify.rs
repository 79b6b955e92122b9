//! core::verify
//!
//! Verification of race aggregate invariants.
//!
//! # Modes
//!
//! - **Fast verify**: run by stores before every write
//!   - One lane per student per race
//!   - One student per lane number per race
//!   - Lane ids unique
//!
//! - **Full verify**: optional deep verification
//!   - Also checks that recorded places form a competition ranking.
//!     Races finalized with incremental validation can fail this check
//!     without being corrupt, so it is never enforced on write.
//!
//! # Invariants
//!
//! - Never mutates the race
//! - Must be deterministic

use std::collections::HashSet;

use thiserror::Error;

use super::model::Race;
use super::ranking;
use super::types::Place;

/// Errors from verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("student {student} can only be assigned to one lane per race")]
    DuplicateStudent { student: u64 },

    #[error("Lane {lane_number} can only have one student")]
    DuplicateLaneNumber { lane_number: u32 },

    #[error("lane id {0} appears more than once")]
    DuplicateLaneId(u64),

    #[error("recorded places do not form a competition ranking")]
    InconsistentPlaces,
}

/// Result of verification.
#[derive(Debug)]
pub struct VerifyResult {
    /// Whether verification passed
    pub ok: bool,
    /// Errors found during verification
    pub errors: Vec<VerifyError>,
}

impl VerifyResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: vec![],
        }
    }

    /// Create a failed result with errors.
    pub fn failure(errors: Vec<VerifyError>) -> Self {
        Self { ok: false, errors }
    }

    fn from_errors(errors: Vec<VerifyError>) -> Self {
        if errors.is_empty() {
            Self::success()
        } else {
            Self::failure(errors)
        }
    }
}

/// Check the uniqueness invariants of a race.
pub fn fast_verify(race: &Race) -> VerifyResult {
    let mut errors = Vec::new();
    let mut students = HashSet::new();
    let mut numbers = HashSet::new();
    let mut ids = HashSet::new();

    for lane in &race.lanes {
        if !students.insert(lane.student_id) {
            errors.push(VerifyError::DuplicateStudent {
                student: lane.student_id.get(),
            });
        }
        if !numbers.insert(lane.lane_number) {
            errors.push(VerifyError::DuplicateLaneNumber {
                lane_number: lane.lane_number.get(),
            });
        }
        if !ids.insert(lane.id) {
            errors.push(VerifyError::DuplicateLaneId(lane.id.get()));
        }
    }

    VerifyResult::from_errors(errors)
}

/// Fast verification plus ranking consistency of recorded places.
pub fn full_verify(race: &Race) -> VerifyResult {
    let mut result = fast_verify(race);

    let placed: Vec<Place> = race.lanes.iter().filter_map(|l| l.student_place).collect();
    if !ranking::is_competition_ranking(&placed) {
        result.ok = false;
        result.errors.push(VerifyError::InconsistentPlaces);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Lane;
    use crate::core::types::{LaneId, LaneNumber, Name, RaceId, StudentId};

    fn race(lanes: &[(u64, u64, i64, Option<i64>)]) -> Race {
        let mut race = Race::new(RaceId::new(1), Name::new("Relay").unwrap());
        race.lanes = lanes
            .iter()
            .map(|&(id, student, number, place)| Lane {
                id: LaneId::new(id),
                student_id: StudentId::new(student),
                lane_number: LaneNumber::new(number).unwrap(),
                student_place: place.map(|p| Place::new(p).unwrap()),
            })
            .collect();
        race
    }

    #[test]
    fn clean_race_passes() {
        let r = race(&[(1, 1, 1, Some(1)), (2, 2, 2, Some(1)), (3, 3, 3, Some(3))]);
        assert!(fast_verify(&r).ok);
        assert!(full_verify(&r).ok);
    }

    #[test]
    fn duplicate_student_detected() {
        let r = race(&[(1, 1, 1, None), (2, 1, 2, None)]);
        let result = fast_verify(&r);
        assert!(!result.ok);
        assert_eq!(result.errors, vec![VerifyError::DuplicateStudent { student: 1 }]);
    }

    #[test]
    fn duplicate_lane_number_detected() {
        let r = race(&[(1, 1, 1, None), (2, 2, 1, None)]);
        let result = fast_verify(&r);
        assert_eq!(
            result.errors,
            vec![VerifyError::DuplicateLaneNumber { lane_number: 1 }]
        );
        assert_eq!(result.errors[0].to_string(), "Lane 1 can only have one student");
    }

    #[test]
    fn full_verify_flags_gapped_places() {
        let r = race(&[(1, 1, 1, Some(1)), (2, 2, 2, Some(1)), (3, 3, 3, Some(2))]);
        assert!(fast_verify(&r).ok);
        let result = full_verify(&r);
        assert!(!result.ok);
        assert_eq!(result.errors, vec![VerifyError::InconsistentPlaces]);
    }
}

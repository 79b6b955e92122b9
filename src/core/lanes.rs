//! core::lanes
//!
//! Lane assignment within a race.
//!
//! Lane numbers are handed out sequentially as `max + 1`. Numbering never
//! fills gaps, so a number is never reused within a race.
//!
//! # Invariants
//!
//! - Lanes are only added while the race is `Open`
//! - A student holds at most one lane per race
//! - A lane number is held by at most one student per race

use tracing::debug;

use super::errors::RaceError;
use super::model::{Lane, Race, Student};
use super::types::{LaneId, LaneNumber};

/// The number the next registered lane will receive.
///
/// # Example
///
/// ```
/// use racekeeper::core::lanes::next_lane_number;
/// use racekeeper::core::model::Race;
/// use racekeeper::core::types::{Name, RaceId};
///
/// let race = Race::new(RaceId::new(1), Name::new("Relay").unwrap());
/// assert_eq!(next_lane_number(&race).get(), 1);
/// ```
pub fn next_lane_number(race: &Race) -> LaneNumber {
    race.lanes
        .iter()
        .map(|l| l.lane_number)
        .max()
        .map(LaneNumber::next)
        .unwrap_or(LaneNumber::FIRST)
}

/// Check that `student` may be registered in `race` and return the lane
/// number they would receive. Nothing is modified.
///
/// # Errors
///
/// - [`RaceError::InvalidState`] if the race is not open for registration
/// - [`RaceError::DuplicateRegistration`] if the student already holds a
///   lane in this race, or the computed lane number is taken
pub fn check_assignable(race: &Race, student: &Student) -> Result<LaneNumber, RaceError> {
    if !race.status.accepts_registrations() {
        return Err(RaceError::InvalidState(format!(
            "Cannot add students as the race status is currently '{}'.",
            race.status.as_str().to_ascii_lowercase()
        )));
    }

    if race.lane_for_student(student.id).is_some() {
        return Err(RaceError::DuplicateRegistration(format!(
            "{} can only be assigned to one lane per race",
            student.name
        )));
    }

    let lane_number = next_lane_number(race);
    if race.lane_by_number(lane_number).is_some() {
        return Err(RaceError::DuplicateRegistration(format!(
            "Lane {lane_number} can only have one student"
        )));
    }

    Ok(lane_number)
}

/// Register a student in the next free lane of an open race.
///
/// Only the new lane is added; existing lanes are untouched. Fails as
/// [`check_assignable`] does.
pub fn assign<'r>(race: &'r mut Race, student: &Student, lane_id: LaneId) -> Result<&'r Lane, RaceError> {
    let lane_number = check_assignable(race, student)?;

    debug!(race = %race.id, student = %student.id, lane = %lane_number, "assigning lane");
    race.lanes.push(Lane {
        id: lane_id,
        student_id: student.id,
        lane_number,
        student_place: None,
    });
    race.touch();

    let index = race.lanes.len() - 1;
    Ok(&race.lanes[index])
}

/// Students from `directory` without a lane in `race`, ordered by name.
pub fn available_students(race: &Race, directory: &[Student]) -> Vec<Student> {
    let mut available: Vec<Student> = directory
        .iter()
        .filter(|s| race.lane_for_student(s.id).is_none())
        .cloned()
        .collect();
    available.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    available
}

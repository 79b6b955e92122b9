//! core::model
//!
//! The race aggregate and the entities it references.
//!
//! A [`Race`] exclusively owns its [`Lane`]s. A lane refers to a
//! [`Student`] by id only; students belong to the directory and outlive
//! any lane that names them.

use serde::{Deserialize, Serialize};

use super::types::{LaneId, LaneNumber, Name, Place, RaceId, RaceStatus, StudentId, UtcTimestamp};

/// A participant registered in the student directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: Name,
}

impl Student {
    pub fn new(id: StudentId, name: Name) -> Self {
        Self { id, name }
    }
}

/// A slot binding one student to one race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub id: LaneId,
    pub student_id: StudentId,
    pub lane_number: LaneNumber,
    /// Finishing place, set when results are recorded.
    #[serde(default)]
    pub student_place: Option<Place>,
}

/// A race and its lanes.
///
/// # Invariants
///
/// - `lanes` holds at most one lane per student
/// - lane numbers are unique within the race
/// - status only moves forward: `Open` -> `Locked` -> `Finalized`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    pub name: Name,
    #[serde(default)]
    pub status: RaceStatus,
    #[serde(default)]
    pub lanes: Vec<Lane>,
    pub created_at: UtcTimestamp,
    pub updated_at: UtcTimestamp,
}

impl Race {
    /// Create an empty race in the `Open` state.
    pub fn new(id: RaceId, name: Name) -> Self {
        let now = UtcTimestamp::now();
        Self {
            id,
            name,
            status: RaceStatus::Open,
            lanes: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Find a lane by id.
    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id == id)
    }

    /// Find the lane held by a student.
    pub fn lane_for_student(&self, student: StudentId) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.student_id == student)
    }

    /// Find the lane with a given number.
    pub fn lane_by_number(&self, number: LaneNumber) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.lane_number == number)
    }

    /// Number of registered participants.
    pub fn participant_count(&self) -> usize {
        self.lanes.len()
    }

    /// Lanes ordered by lane number.
    pub fn lanes_by_number(&self) -> Vec<&Lane> {
        let mut lanes: Vec<&Lane> = self.lanes.iter().collect();
        lanes.sort_by_key(|l| l.lane_number);
        lanes
    }

    /// Lanes that carry a place, ordered by place then lane number.
    pub fn standings(&self) -> Vec<&Lane> {
        let mut placed: Vec<&Lane> = self
            .lanes
            .iter()
            .filter(|l| l.student_place.is_some())
            .collect();
        placed.sort_by_key(|l| (l.student_place, l.lane_number));
        placed
    }

    /// Mark the aggregate as modified.
    pub fn touch(&mut self) {
        self.updated_at = UtcTimestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(id: u64, student: u64, number: i64, place: Option<i64>) -> Lane {
        Lane {
            id: LaneId::new(id),
            student_id: StudentId::new(student),
            lane_number: LaneNumber::new(number).unwrap(),
            student_place: place.map(|p| Place::new(p).unwrap()),
        }
    }

    #[test]
    fn new_race_is_open_and_empty() {
        let race = Race::new(RaceId::new(1), Name::new("100m Sprint").unwrap());
        assert_eq!(race.status, RaceStatus::Open);
        assert_eq!(race.participant_count(), 0);
    }

    #[test]
    fn lookups() {
        let mut race = Race::new(RaceId::new(1), Name::new("Relay").unwrap());
        race.lanes.push(lane(10, 5, 1, None));
        race.lanes.push(lane(11, 6, 2, None));

        assert_eq!(race.lane(LaneId::new(11)).unwrap().student_id, StudentId::new(6));
        assert_eq!(race.lane_for_student(StudentId::new(5)).unwrap().id, LaneId::new(10));
        assert!(race.lane_by_number(LaneNumber::new(3).unwrap()).is_none());
    }

    #[test]
    fn standings_sorted_by_place_then_lane() {
        let mut race = Race::new(RaceId::new(1), Name::new("Hurdles").unwrap());
        race.lanes.push(lane(1, 1, 1, Some(3)));
        race.lanes.push(lane(2, 2, 2, Some(1)));
        race.lanes.push(lane(3, 3, 3, None));
        race.lanes.push(lane(4, 4, 4, Some(1)));

        let order: Vec<u64> = race.standings().iter().map(|l| l.id.get()).collect();
        assert_eq!(order, vec![2, 4, 1]);
    }

    #[test]
    fn missing_place_deserializes_as_none() {
        let json = r#"{"id":1,"student_id":2,"lane_number":1}"#;
        let lane: Lane = serde_json::from_str(json).unwrap();
        assert!(lane.student_place.is_none());
    }
}

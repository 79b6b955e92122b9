//! core::ranking
//!
//! Standard competition ranking ("1224" ranking).
//!
//! Tied finishers share a place, and the place after a group of `k` tied
//! finishers skips `k - 1` positions: `1, 1, 3, 4, 4, 6`.
//!
//! # Rule
//!
//! A candidate place `p` is checked against the places already held by the
//! other lanes of the race:
//!
//! 1. `S` = the ascending sort of the other places plus `p`
//! 2. `idx` = the first index of `p` in `S`
//! 3. if `idx == 0`, `p` must be `1`
//! 4. otherwise `p` must equal `S[idx - 1]` (a tie) or `idx + 1` (no gap)
//!
//! The check depends only on the multiset of places, never on the order in
//! which they were recorded.
//!
//! # Batches
//!
//! [`validate_batch`] checks a whole set of updates against an explicit
//! snapshot of a race's lanes. See [`ValidationMode`] for the two ways a
//! batch can be interpreted.
//!
//! # Example
//!
//! ```
//! use racekeeper::core::ranking::check_place;
//! use racekeeper::core::types::Place;
//!
//! let p = |n| Place::new(n).unwrap();
//!
//! // Two-way tie for first: the next finisher is third.
//! assert!(check_place(&[p(1), p(1)], p(3)).is_ok());
//! assert!(check_place(&[p(1), p(1)], p(2)).is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::model::Lane;
use super::types::{LaneId, LaneNumber, Place, TypeError};

/// How a batch of place updates is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Build the final configuration first, then check every placed lane
    /// against all the others.
    Strict,
    /// Check updates one at a time in the order given. Each update sees the
    /// updates before it in the same batch, but not the ones after it.
    #[default]
    Incremental,
}

impl ValidationMode {
    /// Valid mode names.
    pub const NAMES: &'static [&'static str] = &["strict", "incremental"];

    pub fn as_str(self) -> &'static str {
        match self {
            ValidationMode::Strict => "strict",
            ValidationMode::Incremental => "incremental",
        }
    }
}

impl FromStr for ValidationMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "incremental" => Ok(ValidationMode::Incremental),
            other => Err(TypeError::InvalidMode(format!(
                "'{}', must be one of: {}",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A place that breaks competition ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingViolation {
    /// The rejected place.
    pub place: Place,
    /// First index of `place` in the sorted sequence.
    pub index: usize,
    /// The place sorted immediately before it, if any.
    pub previous: Option<Place>,
    /// Places that would have been accepted at this position.
    pub accepted: Vec<u32>,
}

impl fmt::Display for RankingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accepted = self
            .accepted
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" or ");
        match self.previous {
            None => write!(f, "place {} is invalid, the best place must be {}", self.place, accepted),
            Some(prev) => write!(
                f,
                "place {} is invalid after place {} (position {}), expected {}",
                self.place,
                prev,
                self.index + 1,
                accepted
            ),
        }
    }
}

impl std::error::Error for RankingViolation {}

/// A ranking violation attributed to a lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneViolation {
    pub lane_id: LaneId,
    pub lane_number: LaneNumber,
    pub violation: RankingViolation,
}

impl fmt::Display for LaneViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lane {}: {}", self.lane_number, self.violation)
    }
}

/// Check a candidate place against the places of the other lanes.
///
/// `others` must exclude the lane being validated and any lane without a
/// place. Its order is irrelevant.
///
/// # Errors
///
/// Returns a [`RankingViolation`] describing the position the candidate
/// would take and the places that would have been accepted there.
pub fn check_place(others: &[Place], candidate: Place) -> Result<(), RankingViolation> {
    let mut sorted: Vec<u32> = others.iter().map(|p| p.get()).collect();
    sorted.push(candidate.get());
    sorted.sort_unstable();

    let p = candidate.get();
    // First occurrence: everything before it is strictly smaller.
    let index = sorted.partition_point(|&v| v < p);

    if index == 0 {
        if p == 1 {
            return Ok(());
        }
        return Err(RankingViolation {
            place: candidate,
            index,
            previous: None,
            accepted: vec![1],
        });
    }

    let prev = sorted[index - 1];
    let sequential = u32::try_from(index + 1).unwrap_or(u32::MAX);
    if p == prev || p == sequential {
        return Ok(());
    }

    let mut accepted = vec![prev, sequential];
    accepted.dedup();
    Err(RankingViolation {
        place: candidate,
        index,
        previous: Some(Place::new(i64::from(prev)).unwrap_or(Place::FIRST)),
        accepted,
    })
}

/// Check that a full set of places is a valid competition ranking.
///
/// Every place is checked against all the others.
pub fn is_competition_ranking(places: &[Place]) -> bool {
    (0..places.len()).all(|i| {
        let others: Vec<Place> = places
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, p)| *p)
            .collect();
        check_place(&others, places[i]).is_ok()
    })
}

#[derive(Debug, Clone)]
struct Slot {
    id: LaneId,
    number: LaneNumber,
    place: Option<Place>,
}

fn placed_except(slots: &[Slot], lane: LaneId) -> Vec<Place> {
    slots
        .iter()
        .filter(|s| s.id != lane)
        .filter_map(|s| s.place)
        .collect()
}

/// Validate a batch of place updates against a snapshot of a race's lanes.
///
/// Updates naming a lane that is not in `lanes` are ignored; callers are
/// expected to have resolved lane ids beforehand. The snapshot is never
/// modified.
///
/// # Errors
///
/// Returns every violation found, tagged with its lane.
pub fn validate_batch(
    lanes: &[Lane],
    updates: &[(LaneId, Place)],
    mode: ValidationMode,
) -> Result<(), Vec<LaneViolation>> {
    let mut slots: Vec<Slot> = lanes
        .iter()
        .map(|l| Slot {
            id: l.id,
            number: l.lane_number,
            place: l.student_place,
        })
        .collect();

    let mut violations = Vec::new();

    match mode {
        ValidationMode::Incremental => {
            for &(lane_id, place) in updates {
                let Some(pos) = slots.iter().position(|s| s.id == lane_id) else {
                    continue;
                };
                let others = placed_except(&slots, lane_id);
                if let Err(violation) = check_place(&others, place) {
                    violations.push(LaneViolation {
                        lane_id,
                        lane_number: slots[pos].number,
                        violation,
                    });
                }
                // Later records see this one, accepted or not.
                slots[pos].place = Some(place);
            }
        }
        ValidationMode::Strict => {
            for &(lane_id, place) in updates {
                if let Some(slot) = slots.iter_mut().find(|s| s.id == lane_id) {
                    slot.place = Some(place);
                }
            }
            for slot in slots.iter() {
                let Some(place) = slot.place else {
                    continue;
                };
                let others = placed_except(&slots, slot.id);
                if let Err(violation) = check_place(&others, place) {
                    violations.push(LaneViolation {
                        lane_id: slot.id,
                        lane_number: slot.number,
                        violation,
                    });
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

//! core::lifecycle
//!
//! The race state machine.
//!
//! # States
//!
//! ```text
//! Open --lock--> Locked --record_results--> Finalized
//!   \_____________record_results___________/
//! ```
//!
//! - `Open`: registration allowed (initial state)
//! - `Locked`: registration closed, at least `minimum_capacity` lanes
//! - `Finalized`: places recorded
//!
//! `record_results` finalizes from any state unless
//! [`LifecycleConfig::require_locked_for_results`] is set.
//!
//! # Invariants
//!
//! - Status never moves backwards
//! - A failed operation leaves the race exactly as it was
//! - Capacity is checked when locking, never retroactively

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::errors::{Entity, RaceError};
use super::lanes;
use super::model::{Lane, Race, Student};
use super::ranking::{self, ValidationMode};
use super::types::{LaneId, Name, Place, RaceId, RaceStatus, TypeError};

/// Default number of lanes a race needs before it can be locked.
pub const MINIMUM_CAPACITY: usize = 2;

/// Message returned when results are recorded for a race without lanes.
pub const NO_PARTICIPANTS: &str = "This race has no participants assigned to lanes yet.";

/// Settings that shape the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Lanes required before a race may be locked.
    pub minimum_capacity: usize,
    /// How result batches are validated unless the caller says otherwise.
    pub validation_mode: ValidationMode,
    /// Refuse to record results unless the race is locked.
    pub require_locked_for_results: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            minimum_capacity: MINIMUM_CAPACITY,
            validation_mode: ValidationMode::default(),
            require_locked_for_results: false,
        }
    }
}

/// One requested place update.
///
/// The place is kept raw so that non-positive input is reported as a
/// validation failure by [`RaceLifecycle::record_results`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub lane_id: LaneId,
    pub place: i64,
}

impl Placement {
    pub fn new(lane_id: LaneId, place: i64) -> Self {
        Self { lane_id, place }
    }
}

impl FromStr for Placement {
    type Err = TypeError;

    /// Parse `LANE_ID=PLACE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lane, place) = s.split_once('=').ok_or_else(|| {
            TypeError::InvalidNumber(format!("expected LANE=PLACE, got '{s}'"))
        })?;
        let lane_id: LaneId = lane.parse()?;
        let place = place
            .trim()
            .parse::<i64>()
            .map_err(|_| TypeError::InvalidNumber(format!("place '{}' is not a number", place.trim())))?;
        Ok(Self { lane_id, place })
    }
}

/// Drives races through their lifecycle.
#[derive(Debug, Clone, Default)]
pub struct RaceLifecycle {
    config: LifecycleConfig,
}

impl RaceLifecycle {
    pub fn new(config: LifecycleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Create a race in the `Open` state.
    ///
    /// # Errors
    ///
    /// [`RaceError::Validation`] if the name is blank.
    pub fn create(&self, id: RaceId, name: &str) -> Result<Race, RaceError> {
        let name = Name::new(name)?;
        info!(race = %id, name = %name, "race created");
        Ok(Race::new(id, name))
    }

    /// Register a student in the next lane. See [`lanes::assign`].
    pub fn register<'r>(
        &self,
        race: &'r mut Race,
        student: &Student,
        lane_id: LaneId,
    ) -> Result<&'r Lane, RaceError> {
        let lane = lanes::assign(race, student, lane_id)?;
        info!(lane = %lane.lane_number, student = %student.name, "student registered");
        Ok(lane)
    }

    /// Close registration.
    ///
    /// # Errors
    ///
    /// - [`RaceError::InvalidState`] unless the race is `Open`
    /// - [`RaceError::Capacity`] with fewer than `minimum_capacity` lanes
    pub fn lock(&self, race: &mut Race) -> Result<(), RaceError> {
        if race.status != RaceStatus::Open {
            return Err(RaceError::InvalidState(format!(
                "Race is not in '{}' state and cannot be locked at this time.",
                RaceStatus::Open
            )));
        }

        let actual = race.participant_count();
        if actual < self.config.minimum_capacity {
            return Err(RaceError::Capacity {
                minimum: self.config.minimum_capacity,
                actual,
            });
        }

        race.status = RaceStatus::Locked;
        race.touch();
        info!(race = %race.id, participants = actual, "race locked");
        Ok(())
    }

    /// Record places using the configured validation mode.
    pub fn record_results(&self, race: &mut Race, placements: &[Placement]) -> Result<(), RaceError> {
        self.record_results_with_mode(race, placements, self.config.validation_mode)
    }

    /// Record places and finalize the race.
    ///
    /// The whole batch is checked before anything is written: either every
    /// named lane receives its place and the race becomes `Finalized`, or
    /// the race is left untouched.
    ///
    /// # Errors
    ///
    /// - [`RaceError::InvalidState`] if the race has no lanes, or is not
    ///   locked while `require_locked_for_results` is set
    /// - [`RaceError::NotFound`] if a lane does not belong to the race
    /// - [`RaceError::Validation`] for non-positive places or a lane named
    ///   twice in one batch
    /// - [`RaceError::Ranking`] with every ranking violation found
    pub fn record_results_with_mode(
        &self,
        race: &mut Race,
        placements: &[Placement],
        mode: ValidationMode,
    ) -> Result<(), RaceError> {
        if race.lanes.is_empty() {
            return Err(RaceError::InvalidState(NO_PARTICIPANTS.to_string()));
        }

        if self.config.require_locked_for_results && race.status != RaceStatus::Locked {
            return Err(RaceError::InvalidState(format!(
                "Results can only be recorded for a '{}' race, this race is '{}'.",
                RaceStatus::Locked,
                race.status
            )));
        }

        let updates = resolve(race, placements)?;

        debug!(race = %race.id, updates = updates.len(), %mode, "validating results");
        ranking::validate_batch(&race.lanes, &updates, mode).map_err(RaceError::Ranking)?;

        for (lane_id, place) in &updates {
            if let Some(lane) = race.lanes.iter_mut().find(|l| l.id == *lane_id) {
                lane.student_place = Some(*place);
            }
        }
        race.status = RaceStatus::Finalized;
        race.touch();
        info!(race = %race.id, "race finalized");
        Ok(())
    }
}

/// Check lane membership and place values before any ranking logic runs.
fn resolve(race: &Race, placements: &[Placement]) -> Result<Vec<(LaneId, Place)>, RaceError> {
    let mut seen = HashSet::new();
    let mut updates = Vec::with_capacity(placements.len());

    for placement in placements {
        let lane = race
            .lane(placement.lane_id)
            .ok_or_else(|| RaceError::not_found(Entity::Lane, placement.lane_id.get()))?;

        if !seen.insert(lane.id) {
            return Err(RaceError::Validation(format!(
                "Lane {} appears more than once",
                lane.lane_number
            )));
        }

        let place = Place::new(placement.place).map_err(|e| {
            RaceError::Validation(format!("Lane {}: {}", lane.lane_number, e))
        })?;
        updates.push((lane.id, place));
    }

    Ok(updates)
}

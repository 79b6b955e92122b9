//! core::errors
//!
//! Structured failures returned by race operations.
//!
//! Every operation hands its failure back to the caller unchanged; nothing
//! in the core retries or substitutes defaults. [`RaceError::kind`] gives
//! callers a flat classification to map onto user-facing responses.

use std::fmt;

use thiserror::Error;

use super::ranking::LaneViolation;
use super::types::TypeError;

/// Flat classification of a [`RaceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: blank name, non-positive or non-integer number.
    Validation,
    /// Operation not permitted in the current lifecycle state.
    InvalidState,
    /// Too few participants to lock the race.
    Capacity,
    /// Student or lane number already taken in this race.
    DuplicateRegistration,
    /// Places inconsistent with competition ranking.
    Ranking,
    /// Referenced race, student or lane does not exist.
    NotFound,
    /// The persistence layer failed.
    Storage,
}

/// The kind of record a [`RaceError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Race,
    Student,
    Lane,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Race => "race",
            Entity::Student => "student",
            Entity::Lane => "lane",
        })
    }
}

/// Errors from race operations.
#[derive(Debug, Error)]
pub enum RaceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("must have at least {minimum} participants to be ready.")]
    Capacity {
        /// Configured minimum number of lanes.
        minimum: usize,
        /// Lanes registered at the time of the attempt.
        actual: usize,
    },

    #[error("{0}")]
    DuplicateRegistration(String),

    #[error("{}", describe_violations(.0))]
    Ranking(Vec<LaneViolation>),

    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: u64 },

    /// Raised by whatever persists races; the core does not know which.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RaceError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RaceError::Validation(_) => ErrorKind::Validation,
            RaceError::InvalidState(_) => ErrorKind::InvalidState,
            RaceError::Capacity { .. } => ErrorKind::Capacity,
            RaceError::DuplicateRegistration(_) => ErrorKind::DuplicateRegistration,
            RaceError::Ranking(_) => ErrorKind::Ranking,
            RaceError::NotFound { .. } => ErrorKind::NotFound,
            RaceError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn not_found(entity: Entity, id: u64) -> Self {
        RaceError::NotFound { entity, id }
    }

    /// Individual messages, one per underlying problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            RaceError::Ranking(violations) => violations.iter().map(|v| v.to_string()).collect(),
            other => vec![other.to_string()],
        }
    }
}

impl From<TypeError> for RaceError {
    fn from(e: TypeError) -> Self {
        RaceError::Validation(e.to_string())
    }
}

fn describe_violations(violations: &[LaneViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

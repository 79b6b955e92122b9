//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`RaceId`], [`LaneId`], [`StudentId`] - Store-allocated identifiers
//! - [`Name`] - Validated, non-blank display name (races and students)
//! - [`LaneNumber`] - Positive lane number, unique within a race
//! - [`Place`] - Positive finishing place
//! - [`RaceStatus`] - Lifecycle status of a race
//! - [`UtcTimestamp`] - RFC3339 timestamp
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use racekeeper::core::types::{Name, Place, RaceStatus};
//!
//! // Valid constructions
//! let name = Name::new("100m Sprint").unwrap();
//! let place = Place::new(3).unwrap();
//! assert_eq!(RaceStatus::default(), RaceStatus::Open);
//!
//! // Invalid constructions fail at creation time
//! assert!(Name::new("   ").is_err());
//! assert!(Place::new(0).is_err());
//! assert!("first".parse::<Place>().is_err());
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("invalid race status: {0}")]
    InvalidStatus(String),

    #[error("invalid validation mode: {0}")]
    InvalidMode(String),
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw identifier.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Get the raw identifier.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| TypeError::InvalidId(format!("{} id '{}' is not a number", $label, s)))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a race.
    RaceId,
    "race"
);

define_id!(
    /// Identifier of a lane. Unique across all races.
    LaneId,
    "lane"
);

define_id!(
    /// Identifier of a student in the directory.
    StudentId,
    "student"
);

/// A validated display name.
///
/// Names are trimmed and must not be blank.
///
/// # Example
///
/// ```
/// use racekeeper::core::types::Name;
///
/// let name = Name::new("  Rosa ").unwrap();
/// assert_eq!(name.as_str(), "Rosa");
///
/// assert!(Name::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Create a new validated name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidName` if the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TypeError::InvalidName("name can't be blank".into()));
        }
        if trimmed.chars().any(|c| c.is_control()) {
            return Err(TypeError::InvalidName(
                "name cannot contain control characters".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Name {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a positive integer, rejecting zero, negatives, and non-integers.
fn positive(value: i64, what: &str) -> Result<u32, TypeError> {
    if value < 1 {
        return Err(TypeError::InvalidNumber(format!(
            "{what} must be greater than 0"
        )));
    }
    u32::try_from(value)
        .map_err(|_| TypeError::InvalidNumber(format!("{what} {value} is out of range")))
}

fn parse_positive(s: &str, what: &str) -> Result<u32, TypeError> {
    let value = s
        .trim()
        .parse::<i64>()
        .map_err(|_| TypeError::InvalidNumber(format!("{what} '{s}' is not a number")))?;
    positive(value, what)
}

/// A lane number within a race.
///
/// Lane numbers start at 1 and are assigned sequentially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct LaneNumber(u32);

impl LaneNumber {
    /// The first lane of every race.
    pub const FIRST: LaneNumber = LaneNumber(1);

    /// Create a lane number.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidNumber` unless `value` is a positive integer.
    pub fn new(value: i64) -> Result<Self, TypeError> {
        positive(value, "lane number").map(Self)
    }

    /// The lane number following this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Get the raw number.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for LaneNumber {
    type Error = TypeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LaneNumber> for u32 {
    fn from(n: LaneNumber) -> Self {
        n.0
    }
}

impl FromStr for LaneNumber {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive(s, "lane number").map(Self)
    }
}

impl std::fmt::Display for LaneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finishing place.
///
/// Places are positive integers. Tied finishers share a place.
///
/// # Example
///
/// ```
/// use racekeeper::core::types::Place;
///
/// let p: Place = "2".parse().unwrap();
/// assert_eq!(p.get(), 2);
///
/// assert!(Place::new(-1).is_err());
/// assert!("2.5".parse::<Place>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Place(u32);

impl Place {
    /// First place.
    pub const FIRST: Place = Place(1);

    /// Create a place.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidNumber` unless `value` is a positive integer.
    pub fn new(value: i64) -> Result<Self, TypeError> {
        positive(value, "place").map(Self)
    }

    /// Get the raw place.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Place {
    type Error = TypeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Place> for u32 {
    fn from(p: Place) -> Self {
        p.0
    }
}

impl FromStr for Place {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive(s, "place").map(Self)
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a race.
///
/// Races start `Open`, move to `Locked` once enough participants are
/// registered, and end `Finalized` when results are recorded. The legacy
/// names `SETUP`, `CONFIRMED` and `COMPLETE` are accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RaceStatus {
    /// Registration is open.
    #[default]
    #[serde(alias = "SETUP")]
    Open,
    /// Registration closed, capacity met.
    #[serde(alias = "CONFIRMED")]
    Locked,
    /// Results recorded.
    #[serde(alias = "COMPLETE")]
    Finalized,
}

impl RaceStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [RaceStatus; 3] = [RaceStatus::Open, RaceStatus::Locked, RaceStatus::Finalized];

    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            RaceStatus::Open => "OPEN",
            RaceStatus::Locked => "LOCKED",
            RaceStatus::Finalized => "FINALIZED",
        }
    }

    /// Whether new lanes may be registered.
    pub fn accepts_registrations(self) -> bool {
        self == RaceStatus::Open
    }
}

impl FromStr for RaceStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" | "SETUP" => Ok(RaceStatus::Open),
            "LOCKED" | "CONFIRMED" => Ok(RaceStatus::Locked),
            "FINALIZED" | "COMPLETE" => Ok(RaceStatus::Finalized),
            _ => Err(TypeError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A UTC timestamp in RFC3339 format.
///
/// # Example
///
/// ```
/// use racekeeper::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// assert!(now.to_string().contains('T'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt)
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod name {
        use super::*;

        #[test]
        fn trims_whitespace() {
            assert_eq!(Name::new("  200m sprint ").unwrap().as_str(), "200m sprint");
        }

        #[test]
        fn blank_rejected() {
            assert!(matches!(Name::new(""), Err(TypeError::InvalidName(_))));
            assert!(matches!(Name::new(" \t "), Err(TypeError::InvalidName(_))));
        }

        #[test]
        fn control_characters_rejected() {
            assert!(Name::new("bad\u{7}name").is_err());
        }

        #[test]
        fn deserialize_validates() {
            let result: Result<Name, _> = serde_json::from_str("\"\"");
            assert!(result.is_err());
        }
    }

    mod place {
        use super::*;

        #[test]
        fn positive_accepted() {
            assert_eq!(Place::new(1).unwrap(), Place::FIRST);
            assert_eq!(Place::new(42).unwrap().get(), 42);
        }

        #[test]
        fn zero_and_negative_rejected() {
            let err = Place::new(0).unwrap_err();
            assert!(err.to_string().contains("must be greater than 0"));
            assert!(Place::new(-3).is_err());
        }

        #[test]
        fn non_integer_text_rejected() {
            let err = "first".parse::<Place>().unwrap_err();
            assert!(err.to_string().contains("is not a number"));
            assert!("1.5".parse::<Place>().is_err());
        }

        #[test]
        fn deserialize_rejects_zero() {
            let result: Result<Place, _> = serde_json::from_str("0");
            assert!(result.is_err());
        }
    }

    mod lane_number {
        use super::*;

        #[test]
        fn next_increments() {
            assert_eq!(LaneNumber::FIRST.next().get(), 2);
        }

        #[test]
        fn text_parsing() {
            assert_eq!("3".parse::<LaneNumber>().unwrap().get(), 3);
            assert!("three".parse::<LaneNumber>().is_err());
        }
    }

    mod race_status {
        use super::*;

        #[test]
        fn default_is_open() {
            assert_eq!(RaceStatus::default(), RaceStatus::Open);
        }

        #[test]
        fn serializes_canonical_names() {
            let json = serde_json::to_string(&RaceStatus::Finalized).unwrap();
            assert_eq!(json, "\"FINALIZED\"");
        }

        #[test]
        fn legacy_names_accepted() {
            let s: RaceStatus = serde_json::from_str("\"SETUP\"").unwrap();
            assert_eq!(s, RaceStatus::Open);
            let s: RaceStatus = serde_json::from_str("\"CONFIRMED\"").unwrap();
            assert_eq!(s, RaceStatus::Locked);
            assert_eq!("complete".parse::<RaceStatus>().unwrap(), RaceStatus::Finalized);
        }

        #[test]
        fn unknown_rejected() {
            assert!("CANCELLED".parse::<RaceStatus>().is_err());
        }
    }

    mod ids {
        use super::*;

        #[test]
        fn parse_and_display() {
            let id: RaceId = "17".parse().unwrap();
            assert_eq!(id, RaceId::new(17));
            assert_eq!(id.to_string(), "17");
        }

        #[test]
        fn non_numeric_rejected() {
            let err = "abc".parse::<StudentId>().unwrap_err();
            assert!(err.to_string().contains("student id"));
        }
    }

    mod utc_timestamp {
        use super::*;

        #[test]
        fn serde_roundtrip() {
            let ts = UtcTimestamp::now();
            let json = serde_json::to_string(&ts).unwrap();
            let parsed: UtcTimestamp = serde_json::from_str(&json).unwrap();
            assert_eq!(ts, parsed);
        }
    }
}

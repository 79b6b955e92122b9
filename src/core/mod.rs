//! core
//!
//! Core domain types, rules and schemas for racekeeper.
//!
//! # Modules
//!
//! - [`types`] - Strong types: RaceId, Name, LaneNumber, Place, RaceStatus
//! - [`model`] - The race aggregate: Race, Lane, Student
//! - [`errors`] - Structured operation failures
//! - [`lanes`] - Sequential lane assignment
//! - [`ranking`] - Standard competition ranking validation
//! - [`lifecycle`] - The OPEN -> LOCKED -> FINALIZED state machine
//! - [`verify`] - Aggregate invariant checks
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for racekeeper storage
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - All rules are deterministic and free of I/O

pub mod config;
pub mod errors;
pub mod lanes;
pub mod lifecycle;
pub mod model;
pub mod paths;
pub mod ranking;
pub mod types;
pub mod verify;

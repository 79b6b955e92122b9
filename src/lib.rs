//! racekeeper - Lane assignment and results for school races
//!
//! racekeeper is a single-binary tool (`rk`) for running races: students are
//! assigned sequential lanes, registration is locked once enough participants
//! have joined, and finishing places are recorded under standard competition
//! ranking ("1224" ranking).
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Runs Load -> Apply -> Save for every operation
//! - [`core`] - Domain types, lane assignment, lifecycle and ranking rules
//! - [`store`] - Persistence traits with file and in-memory stores
//! - [`ui`] - Output formatting
//!
//! # Correctness Invariants
//!
//! racekeeper maintains the following invariants:
//!
//! 1. A student holds at most one lane per race, a lane number at most one student
//! 2. Race status only moves forward: OPEN -> LOCKED -> FINALIZED
//! 3. A rejected result batch changes nothing
//! 4. Stored data is written atomically and never silently corrupted

pub mod cli;
pub mod core;
pub mod engine;
pub mod store;
pub mod ui;

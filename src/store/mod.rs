//! store
//!
//! Persistence for students and race aggregates.
//!
//! # Architecture
//!
//! The engine talks to storage through two traits:
//!
//! - [`RaceStore`]: races with their lanes, saved as one aggregate
//! - [`StudentDirectory`]: the student list
//!
//! Implementations:
//!
//! - [`FileStore`]: one JSON document under a locked data directory (default)
//! - [`MemoryStore`]: nothing persisted
//!
//! Both keep a [`Document`] and share its integrity rules.

mod document;
mod file_store;
pub mod lock;
mod memory;
mod traits;

pub use document::{Document, NextIds, DOCUMENT_KIND, SCHEMA_VERSION};
pub use file_store::FileStore;
pub use lock::{LockError, StoreLock};
pub use memory::MemoryStore;
pub use traits::{RaceStore, StoreError, StudentDirectory};

/// A store usable by the engine.
pub trait Store: RaceStore + StudentDirectory {}

impl<T: RaceStore + StudentDirectory> Store for T {}

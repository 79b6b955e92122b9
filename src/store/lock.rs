//! store::lock
//!
//! Exclusive lock on a racekeeper data directory.
//!
//! Only one [`FileStore`](super::FileStore) may have a data directory open
//! at a time. The lock is an OS-level exclusive lock on `<data_dir>/lock`,
//! so it also serialises separate `rk` processes.
//!
//! # Invariants
//!
//! - Lock is held for the lifetime of the store handle
//! - Lock is released on drop
//! - Acquisition never blocks (fails fast if locked)

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::DataPaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("data directory is locked by another racekeeper process")]
    AlreadyLocked,

    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    /// Failed to release the lock.
    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// An exclusive lock on a data directory, released on drop.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    /// Present while the lock is held.
    file: Option<File>,
}

impl StoreLock {
    /// Acquire the lock for `paths`, creating the data directory if needed.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another handle holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &DataPaths) -> Result<Self, LockError> {
        fs::create_dir_all(&paths.data_dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", paths.data_dir.display(), e))
        })?;

        let path = paths.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(LockError::AlreadyLocked),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                Err(LockError::AlreadyLocked)
            }
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock before the guard is dropped.
    pub fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            file.unlock()
                .map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths(temp: &TempDir) -> DataPaths {
        DataPaths::new(temp.path().join("data"))
    }

    #[test]
    fn acquire_creates_data_dir() {
        let temp = TempDir::new().unwrap();
        let paths = paths(&temp);
        assert!(!paths.data_dir.exists());

        let lock = StoreLock::acquire(&paths).unwrap();
        assert!(lock.is_held());
        assert_eq!(lock.path(), paths.lock_path());
        assert!(paths.data_dir.exists());
    }

    #[test]
    fn second_acquire_fails() {
        let temp = TempDir::new().unwrap();
        let paths = paths(&temp);

        let _first = StoreLock::acquire(&paths).unwrap();
        let second = StoreLock::acquire(&paths);
        assert!(matches!(second, Err(LockError::AlreadyLocked)));
    }

    #[test]
    fn released_on_drop() {
        let temp = TempDir::new().unwrap();
        let paths = paths(&temp);

        {
            let _lock = StoreLock::acquire(&paths).unwrap();
        }
        assert!(StoreLock::acquire(&paths).unwrap().is_held());
    }

    #[test]
    fn release_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let paths = paths(&temp);

        let mut lock = StoreLock::acquire(&paths).unwrap();
        lock.release().unwrap();
        lock.release().unwrap();
        assert!(!lock.is_held());
        assert!(StoreLock::acquire(&paths).is_ok());
    }
}

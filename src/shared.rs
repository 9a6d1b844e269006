//! Cross-thread buffer handle
//!
//! The editor's UI thread performs all mutations; indexer and search
//! threads only read. One reader-writer lock per buffer enforces exactly
//! that: a write guard covers a whole primitive edit, so readers always
//! observe line table, byte-count tree and mark tree from the same edit
//! generation. No other synchronization exists in the core.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::buffer::Buffer;

/// Clone-able handle sharing one buffer between threads
#[derive(Clone)]
pub struct SharedBuffer {
    inner: Arc<RwLock<Buffer>>,
}

impl SharedBuffer {
    #[must_use]
    pub fn new(buf: Buffer) -> Self {
        Self {
            inner: Arc::new(RwLock::new(buf)),
        }
    }

    /// Shared read access for consistent snapshots. Hold the guard for
    /// the whole of a streaming read.
    pub fn read(&self) -> RwLockReadGuard<'_, Buffer> {
        self.inner.read().expect("buffer lock poisoned")
    }

    /// Exclusive access for mutations
    pub fn write(&self) -> RwLockWriteGuard<'_, Buffer> {
        self.inner.write().expect("buffer lock poisoned")
    }
}

impl From<Buffer> for SharedBuffer {
    fn from(buf: Buffer) -> Self {
        Self::new(buf)
    }
}

#[cfg(test)]
#[path = "shared_tests.rs"]
mod tests;

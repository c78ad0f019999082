//! Small round-robin pool of read-only connections.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use calibra_core::errors::StorageError;
use rusqlite::{Connection, OpenFlags};

use super::pragmas::apply_pragmas;

/// Fixed-size pool of read connections, handed out round-robin. A slot
/// being busy just means the caller blocks on that slot's mutex; reads
/// are short.
pub struct ReadPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    /// Open `size` read-only connections to the database at `path`.
    pub fn open(path: &Path, size: usize) -> Result<Self, StorageError> {
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size.max(1) {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| StorageError::SqliteError {
                message: e.to_string(),
            })?;
            // Read-only connections still want the busy timeout.
            conn.execute_batch("PRAGMA busy_timeout = 5000;")
                .map_err(|e| StorageError::SqliteError {
                    message: e.to_string(),
                })?;
            connections.push(Mutex::new(conn));
        }
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// A pool with no connections; `DatabaseManager` falls back to the
    /// writer (in-memory databases cannot share connections).
    pub fn empty() -> Self {
        Self {
            connections: Vec::new(),
            next: AtomicUsize::new(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Pool size derived from available parallelism, capped small: reads
    /// here are point lookups and snapshots, not scans.
    pub fn default_size() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2)
            .min(4)
    }

    /// Run a read closure on the next pooled connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let guard = self.connections[index]
            .lock()
            .map_err(|_| StorageError::SqliteError {
                message: "read lock poisoned".to_string(),
            })?;
        f(&guard)
    }
}

// A fresh database file may not exist yet when the pool opens read-only
// connections; `DatabaseManager::open` opens the writer (creating the
// file and running migrations) before constructing the pool.

//! Pooled SQLite connections.
//!
//! r2d2 owns checkout and return; every connection it opens goes through
//! [`configure`] first, so foreign keys and the busy timeout hold for all of
//! them.

use crate::error::{ReferatError, Result};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// A pool of rusqlite connections to one database.
pub type ConnectionPool = r2d2::Pool<SqliteConnectionManager>;

/// A connection checked out of a [`ConnectionPool`].
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Open a pool of `size` connections to the database file at `path`.
pub fn open(path: &Path, size: usize, busy_timeout: Duration) -> Result<ConnectionPool> {
    let max_size = u32::try_from(size)
        .ok()
        .filter(|s| *s > 0)
        .ok_or_else(|| ReferatError::Config(format!("Invalid connection pool size {}", size)))?;

    let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        // journal_mode returns a row, so it can't go through execute_batch.
        conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))?;
        configure(conn)
    });

    let pool = r2d2::Pool::builder()
        .max_size(max_size)
        .connection_timeout(busy_timeout.max(Duration::from_secs(1)))
        .build(manager)?;

    debug!("Opened {} connections to {:?}", max_size, path);
    Ok(pool)
}

/// A single-connection pool over a private in-memory database.
///
/// The connection is never recycled, since a new one would start empty.
pub fn in_memory() -> Result<ConnectionPool> {
    let manager = SqliteConnectionManager::memory().with_init(configure);

    let pool = r2d2::Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .build(manager)?;
    Ok(pool)
}

/// Per-connection settings.
fn configure(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

//! Read-only access to the Bear database file.
//!
//! Bear owns this database and keeps writing to it while the server runs.
//! A single connection behind a mutex is plenty for MCP traffic, and
//! `SQLITE_OPEN_READ_ONLY` makes accidental writes impossible at the
//! SQLite level rather than by convention.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use crate::config::BearDbConfig;
use crate::error::{BearDbError, BearDbResult};

/// Thread-safe wrapper around the read-only connection.
#[derive(Clone, Debug)]
pub struct ReadPool {
    conn: Arc<Mutex<Connection>>,
}

impl ReadPool {
    /// Opens the database read-only, verifying the file exists and parses
    /// as SQLite before the pool is handed out.
    pub fn open(config: &BearDbConfig) -> BearDbResult<Self> {
        if !config.path.exists() {
            return Err(BearDbError::NotFound(config.path.clone()));
        }

        info!(path = ?config.path, "Opening Bear database read-only");

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&config.path, flags)
            .map_err(|e| BearDbError::Connection(format!("Failed to open Bear database: {e}")))?;

        // Bear may hold write locks briefly while syncing.
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| BearDbError::Connection(format!("Failed to set busy timeout: {e}")))?;

        // Reading the schema version forces SQLite to parse the file header,
        // so a file that is not a database fails here rather than on the
        // first query.
        conn.query_row("PRAGMA schema_version", [], |_row| Ok(()))
            .map_err(|e| BearDbError::Connection(format!("Failed to open Bear database: {e}")))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute a closure with the connection.
    pub fn with_connection<F, T>(&self, f: F) -> BearDbResult<T>
    where
        F: FnOnce(&Connection) -> BearDbResult<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Closes the underlying connection if this is the last handle.
    ///
    /// Dropping the pool closes the connection too; this form surfaces any
    /// close-time error instead of discarding it. With clones still alive
    /// the call is a no-op and the last handle to drop closes the file.
    pub fn close(self) -> BearDbResult<()> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => mutex.into_inner().close().map_err(|(_conn, e)| {
                BearDbError::Connection(format!("Failed to close database: {e}"))
            }),
            Err(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn empty_db(dir: &TempDir) -> BearDbConfig {
        let path = dir.path().join("empty.sqlite");
        let conn = Connection::open(&path).expect("create database");
        conn.execute("CREATE TABLE probe (x INTEGER)", [])
            .expect("create table");
        drop(conn);
        BearDbConfig::new(path)
    }

    #[test]
    fn test_open_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let config = BearDbConfig::new(dir.path().join("nope.sqlite"));

        let err = ReadPool::open(&config).unwrap_err();
        assert!(matches!(err, BearDbError::NotFound(_)));
    }

    #[test]
    fn test_open_non_database_file_is_connection_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.sqlite");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"this is not a sqlite database").unwrap();
        drop(file);

        let err = ReadPool::open(&BearDbConfig::new(path)).unwrap_err();
        assert!(matches!(err, BearDbError::Connection(_)));
    }

    #[test]
    fn test_open_and_query() {
        let dir = TempDir::new().unwrap();
        let pool = ReadPool::open(&empty_db(&dir)).expect("open pool");

        let two = pool
            .with_connection(|conn| {
                let n: i64 = conn.query_row("SELECT 1 + 1", [], |row| row.get(0))?;
                Ok(n)
            })
            .expect("query");
        assert_eq!(two, 2);
    }

    #[test]
    fn test_writes_are_rejected() {
        let dir = TempDir::new().unwrap();
        let pool = ReadPool::open(&empty_db(&dir)).expect("open pool");

        let err = pool
            .with_connection(|conn| {
                conn.execute("INSERT INTO probe (x) VALUES (1)", [])?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, BearDbError::Query(_)));
    }

    #[test]
    fn test_pool_is_debug() {
        // unwrap_err in the open tests needs the Ok side to format too.
        let dir = TempDir::new().unwrap();
        let pool = ReadPool::open(&empty_db(&dir)).expect("open pool");
        assert!(format!("{pool:?}").contains("ReadPool"));
    }

    #[test]
    fn test_close_with_clones_alive_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let pool = ReadPool::open(&empty_db(&dir)).expect("open pool");
        let clone = pool.clone();

        pool.close().expect("close with live clone");

        // The remaining handle still works, then closes for real.
        clone
            .with_connection(|conn| {
                conn.query_row("SELECT 1", [], |_row| Ok(()))?;
                Ok(())
            })
            .expect("query after sibling close");
        clone.close().expect("final close");
    }
}

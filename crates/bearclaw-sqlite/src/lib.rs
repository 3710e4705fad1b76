//! SQLite access to Bear's note store.
//!
//! Bear keeps notes in `database.sqlite` inside its macOS group container.
//! This crate opens that file read-only and exposes typed queries over the
//! `ZSFNOTE` table: lookups, search, tag aggregation, and statistics.
//! Writes never happen here; Bear only accepts writes through its
//! x-callback-url scheme, which the MCP layer drives separately.

pub mod config;
pub mod connection;
pub mod error;
pub mod query;
pub mod repository;
pub mod stats;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod test_fixtures;

// Re-exports
pub use config::{BearDbConfig, DB_PATH_ENV};
pub use connection::ReadPool;
pub use error::{BearDbError, BearDbResult};
pub use query::NoteQuery;
pub use repository::BearDb;
pub use stats::{LengthDistribution, NoteStatistics};

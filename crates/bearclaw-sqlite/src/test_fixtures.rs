//! Shared test fixtures: a miniature Bear schema with seedable notes.
//!
//! Only the `ZSFNOTE` columns the repository reads are modeled. Fixture
//! databases live in a `TempDir` because the pool opens files read-only
//! and refuses paths that do not exist. Downstream crates get this module
//! through the `test-fixtures` feature.

use bearclaw_core::to_native_seconds;
use chrono::{DateTime, Utc};
use rusqlite::params;
use tempfile::TempDir;

use crate::config::BearDbConfig;

pub use rusqlite::Connection;

pub const SCHEMA: &str = "
    CREATE TABLE ZSFNOTE (
        Z_PK INTEGER PRIMARY KEY,
        ZUNIQUEIDENTIFIER TEXT NOT NULL,
        ZTITLE TEXT,
        ZTEXT TEXT,
        ZCREATIONDATE REAL,
        ZMODIFICATIONDATE REAL,
        ZPINNED INTEGER NOT NULL DEFAULT 0,
        ZTRASHED INTEGER NOT NULL DEFAULT 0
    )
";

/// Creates an on-disk database with the Bear schema, returning a config
/// pointing at it plus a read-write connection for seeding.
pub fn seeded_db(dir: &TempDir) -> (BearDbConfig, Connection) {
    let path = dir.path().join("database.sqlite");
    let conn = Connection::open(&path).expect("open fixture database");
    conn.execute(SCHEMA, []).expect("create ZSFNOTE");
    (BearDbConfig::new(path), conn)
}

/// One seedable note row. Builder-style setters keep call sites short;
/// the title defaults to the identifier so lookups by either work.
pub struct SeedNote {
    id: String,
    title: Option<String>,
    text: Option<String>,
    created: f64,
    modified: f64,
    pinned: bool,
    trashed: bool,
}

impl SeedNote {
    pub fn new(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            title: Some(id.to_string()),
            text: Some(text.to_string()),
            created: 700_000_000.0,
            modified: 700_000_000.0,
            pinned: false,
            trashed: false,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn untitled(mut self) -> Self {
        self.title = None;
        self
    }

    pub fn no_text(mut self) -> Self {
        self.text = None;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created = to_native_seconds(at);
        self
    }

    pub fn modified_at(mut self, at: DateTime<Utc>) -> Self {
        self.modified = to_native_seconds(at);
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub fn trashed(mut self) -> Self {
        self.trashed = true;
        self
    }

    pub fn insert(self, conn: &Connection) {
        conn.execute(
            "INSERT INTO ZSFNOTE
                 (ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT, ZCREATIONDATE, ZMODIFICATIONDATE, ZPINNED, ZTRASHED)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                self.id,
                self.title,
                self.text,
                self.created,
                self.modified,
                self.pinned,
                self.trashed,
            ],
        )
        .expect("insert seed note");
    }
}

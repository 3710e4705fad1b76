//! The note repository: typed read operations over `ZSFNOTE`.

use bearclaw_core::{
    count_tags, extract_tags, to_datetime, to_native_seconds, Note, SearchOptions, SortField, Tag,
};
use chrono::{DateTime, Utc};
use rusqlite::{params_from_iter, Connection, Row};
use tracing::debug;

use crate::config::BearDbConfig;
use crate::connection::ReadPool;
use crate::error::{BearDbError, BearDbResult};
use crate::query::NoteQuery;

/// Title shown for notes whose `ZTITLE` is NULL.
const UNTITLED: &str = "Untitled";

/// `ZTEXT` of every live note; tag aggregation scans these bodies.
const TAG_TEXTS: &str = "
    SELECT ZTEXT FROM ZSFNOTE
    WHERE ZTRASHED = 0 AND ZTEXT IS NOT NULL
";

/// Read-side handle to the Bear note store.
///
/// Every operation excludes trashed notes. rusqlite is synchronous, so each
/// call clones the pool handle and hops to the blocking thread pool; the
/// handle itself is cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct BearDb {
    pub(crate) pool: ReadPool,
}

impl BearDb {
    /// Opens the store at the configured location.
    pub fn open(config: &BearDbConfig) -> BearDbResult<Self> {
        Ok(Self {
            pool: ReadPool::open(config)?,
        })
    }

    /// Releases the underlying connection. See [`ReadPool::close`].
    pub fn close(self) -> BearDbResult<()> {
        self.pool.close()
    }

    /// Looks a note up by exact title or by note identifier.
    pub async fn note_by_title_or_id(&self, query: &str) -> BearDbResult<Option<Note>> {
        let query = NoteQuery::ByTitleOrId {
            query: query.to_string(),
        };
        Ok(self.run(query).await?.into_iter().next())
    }

    /// Free-text and tag search, newest modification first.
    pub async fn search_notes(&self, options: SearchOptions) -> BearDbResult<Vec<Note>> {
        self.run(NoteQuery::Search(options)).await
    }

    /// Notes whose body mentions `#tag`, newest modification first.
    pub async fn notes_by_tag(&self, tag: &str) -> BearDbResult<Vec<Note>> {
        self.run(NoteQuery::ByTag {
            tag: tag.to_string(),
        })
        .await
    }

    /// The most recently modified notes.
    pub async fn recent_notes(&self, limit: u32, include_pinned: bool) -> BearDbResult<Vec<Note>> {
        self.run(NoteQuery::Recent {
            limit,
            include_pinned,
        })
        .await
    }

    /// Pinned notes, newest first by the given field.
    pub async fn pinned_notes(&self, sort: SortField) -> BearDbResult<Vec<Note>> {
        self.run(NoteQuery::Pinned { sort }).await
    }

    /// Notes whose chosen timestamp falls inside `[start, end]`, both ends
    /// inclusive.
    pub async fn notes_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        field: SortField,
        limit: u32,
    ) -> BearDbResult<Vec<Note>> {
        if start > end {
            return Err(BearDbError::Validation(
                "start date must not be after end date".to_string(),
            ));
        }
        self.run(NoteQuery::DateRange {
            start: to_native_seconds(start),
            end: to_native_seconds(end),
            field,
            limit,
        })
        .await
    }

    /// Every tag in the store with occurrence counts, most used first.
    pub async fn all_tags(&self) -> BearDbResult<Vec<Tag>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || pool.with_connection(load_tags))
            .await
            .map_err(|e| BearDbError::Task(e.to_string()))?
    }

    async fn run(&self, query: NoteQuery) -> BearDbResult<Vec<Note>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| fetch_notes(conn, &query))
        })
        .await
        .map_err(|e| BearDbError::Task(e.to_string()))?
    }
}

fn fetch_notes(conn: &Connection, query: &NoteQuery) -> BearDbResult<Vec<Note>> {
    debug!(?query, "Running note query");
    let mut stmt = conn.prepare(query.sql())?;
    let notes = stmt
        .query_map(params_from_iter(query.params()), row_to_note)?
        .collect::<Result<Vec<Note>, _>>()?;
    Ok(notes)
}

pub(crate) fn load_tags(conn: &Connection) -> BearDbResult<Vec<Tag>> {
    debug!("Aggregating tag counts over live note bodies");
    let mut stmt = conn.prepare(TAG_TEXTS)?;
    let texts = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(count_tags(texts.iter().map(String::as_str)))
}

/// Maps a `ZSFNOTE` row in template column order. NULLs are normalized
/// here so the rest of the workspace never sees them.
fn row_to_note(row: &Row<'_>) -> rusqlite::Result<Note> {
    let content: String = row.get::<_, Option<String>>(2)?.unwrap_or_default();
    Ok(Note {
        id: row.get(0)?,
        title: row
            .get::<_, Option<String>>(1)?
            .unwrap_or_else(|| UNTITLED.to_string()),
        tags: extract_tags(&content),
        creation_date: to_datetime(row.get::<_, Option<f64>>(3)?.unwrap_or(0.0)),
        modification_date: to_datetime(row.get::<_, Option<f64>>(4)?.unwrap_or(0.0)),
        is_pinned: row.get::<_, Option<i64>>(5)?.unwrap_or(0) != 0,
        is_trashed: row.get::<_, Option<i64>>(6)?.unwrap_or(0) != 0,
        content,
    })
}

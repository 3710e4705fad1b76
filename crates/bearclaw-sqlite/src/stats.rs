//! Aggregated statistics over the live note store.

use bearclaw_core::{to_native_seconds, Tag};
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

use crate::error::{BearDbError, BearDbResult};
use crate::repository::{load_tags, BearDb};

const COUNT_LIVE: &str = "SELECT COUNT(*) FROM ZSFNOTE WHERE ZTRASHED = 0";
const COUNT_PINNED: &str = "SELECT COUNT(*) FROM ZSFNOTE WHERE ZTRASHED = 0 AND ZPINNED = 1";
const COUNT_TAGGED: &str = "SELECT COUNT(*) FROM ZSFNOTE WHERE ZTRASHED = 0 AND ZTEXT LIKE '%#%'";
const AVERAGE_LENGTH: &str = "SELECT AVG(LENGTH(ZTEXT)) FROM ZSFNOTE WHERE ZTRASHED = 0";
const COUNT_CREATED_SINCE: &str =
    "SELECT COUNT(*) FROM ZSFNOTE WHERE ZTRASHED = 0 AND ZCREATIONDATE >= ?";
const COUNT_MODIFIED_SINCE: &str =
    "SELECT COUNT(*) FROM ZSFNOTE WHERE ZTRASHED = 0 AND ZMODIFICATIONDATE >= ?";
const LENGTH_BUCKETS: &str = "
    SELECT
        SUM(CASE WHEN LENGTH(ZTEXT) < 100 THEN 1 ELSE 0 END),
        SUM(CASE WHEN LENGTH(ZTEXT) >= 100 AND LENGTH(ZTEXT) < 500 THEN 1 ELSE 0 END),
        SUM(CASE WHEN LENGTH(ZTEXT) >= 500 AND LENGTH(ZTEXT) < 2000 THEN 1 ELSE 0 END),
        SUM(CASE WHEN LENGTH(ZTEXT) >= 2000 AND LENGTH(ZTEXT) < 5000 THEN 1 ELSE 0 END),
        SUM(CASE WHEN LENGTH(ZTEXT) >= 5000 THEN 1 ELSE 0 END)
    FROM ZSFNOTE WHERE ZTRASHED = 0
";

/// Point-in-time snapshot of the note store.
#[derive(Debug, Clone, Serialize)]
pub struct NoteStatistics {
    pub total_notes: i64,
    pub pinned_notes: i64,
    /// Notes whose body contains at least one `#`.
    pub notes_with_tags: i64,
    pub unique_tags: usize,
    /// The ten most used tags, occurrence counts included.
    pub top_tags: Vec<Tag>,
    /// Mean body length in characters; 0 when the store is empty.
    pub average_note_length: f64,
    pub created_this_week: i64,
    pub modified_this_week: i64,
    pub created_this_month: i64,
    pub modified_this_month: i64,
    pub length_distribution: LengthDistribution,
}

/// Note counts bucketed by body length in characters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LengthDistribution {
    /// Under 100.
    pub very_short: i64,
    /// 100 to 499.
    pub short: i64,
    /// 500 to 1999.
    pub medium: i64,
    /// 2000 to 4999.
    pub long: i64,
    /// 5000 and up.
    pub very_long: i64,
}

impl BearDb {
    /// Collects statistics in one pass over the store.
    ///
    /// The reference instant is captured once so the week and month windows
    /// agree with each other.
    pub async fn statistics(&self) -> BearDbResult<NoteStatistics> {
        debug!("Computing note statistics");
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| collect(conn, Utc::now()))
        })
        .await
        .map_err(|e| BearDbError::Task(e.to_string()))?
    }
}

fn collect(conn: &Connection, now: DateTime<Utc>) -> BearDbResult<NoteStatistics> {
    let week_ago = to_native_seconds(now - Duration::days(7));
    let month_ago = to_native_seconds(now - Duration::days(30));

    let tags = load_tags(conn)?;
    let unique_tags = tags.len();
    let mut top_tags = tags;
    top_tags.truncate(10);

    let average: Option<f64> = conn.query_row(AVERAGE_LENGTH, [], |row| row.get(0))?;

    // SUM over zero rows is NULL, not 0.
    let length_distribution = conn.query_row(LENGTH_BUCKETS, [], |row| {
        Ok(LengthDistribution {
            very_short: row.get::<_, Option<i64>>(0)?.unwrap_or(0),
            short: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
            medium: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
            long: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
            very_long: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
        })
    })?;

    Ok(NoteStatistics {
        total_notes: count(conn, COUNT_LIVE, [])?,
        pinned_notes: count(conn, COUNT_PINNED, [])?,
        notes_with_tags: count(conn, COUNT_TAGGED, [])?,
        unique_tags,
        top_tags,
        average_note_length: average.unwrap_or(0.0),
        created_this_week: count(conn, COUNT_CREATED_SINCE, [week_ago])?,
        modified_this_week: count(conn, COUNT_MODIFIED_SINCE, [week_ago])?,
        created_this_month: count(conn, COUNT_CREATED_SINCE, [month_ago])?,
        modified_this_month: count(conn, COUNT_MODIFIED_SINCE, [month_ago])?,
        length_distribution,
    })
}

fn count<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> BearDbResult<i64> {
    Ok(conn.query_row(sql, params, |row| row.get(0))?)
}

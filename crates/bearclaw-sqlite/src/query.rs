//! SQL templates for the Bear schema.
//!
//! Every read goes through [`NoteQuery`]: one variant per repository
//! operation, each mapped to a fixed SQL template plus its bound
//! parameters. Templates all select the same column list in the same
//! order; the row mapper in `repository` indexes by that order.

use bearclaw_core::{normalize_tag, SearchOptions, SortField};
use rusqlite::types::ToSql;

/// SQLite treats a negative LIMIT as "no limit".
const UNLIMITED: i64 = -1;

const BY_TITLE_OR_ID: &str = "
    SELECT ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT, ZCREATIONDATE, ZMODIFICATIONDATE, ZPINNED, ZTRASHED
    FROM ZSFNOTE
    WHERE (ZTITLE = ?1 OR ZUNIQUEIDENTIFIER = ?1) AND ZTRASHED = 0
    LIMIT 1
";

const ALL_RECENT_FIRST: &str = "
    SELECT ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT, ZCREATIONDATE, ZMODIFICATIONDATE, ZPINNED, ZTRASHED
    FROM ZSFNOTE
    WHERE ZTRASHED = 0
    ORDER BY ZMODIFICATIONDATE DESC
    LIMIT ?
";

const UNPINNED_RECENT_FIRST: &str = "
    SELECT ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT, ZCREATIONDATE, ZMODIFICATIONDATE, ZPINNED, ZTRASHED
    FROM ZSFNOTE
    WHERE ZTRASHED = 0 AND ZPINNED = 0
    ORDER BY ZMODIFICATIONDATE DESC
    LIMIT ?
";

const MATCH_TERM: &str = "
    SELECT ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT, ZCREATIONDATE, ZMODIFICATIONDATE, ZPINNED, ZTRASHED
    FROM ZSFNOTE
    WHERE ZTRASHED = 0 AND (ZTITLE LIKE ?1 OR ZTEXT LIKE ?1)
    ORDER BY ZMODIFICATIONDATE DESC
    LIMIT ?2
";

const MATCH_TAG: &str = "
    SELECT ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT, ZCREATIONDATE, ZMODIFICATIONDATE, ZPINNED, ZTRASHED
    FROM ZSFNOTE
    WHERE ZTRASHED = 0 AND ZTEXT LIKE ?
    ORDER BY ZMODIFICATIONDATE DESC
    LIMIT ?
";

const MATCH_TERM_AND_TAG: &str = "
    SELECT ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT, ZCREATIONDATE, ZMODIFICATIONDATE, ZPINNED, ZTRASHED
    FROM ZSFNOTE
    WHERE ZTRASHED = 0 AND (ZTITLE LIKE ?1 OR ZTEXT LIKE ?1) AND ZTEXT LIKE ?2
    ORDER BY ZMODIFICATIONDATE DESC
    LIMIT ?3
";

const PINNED_BY_CREATED: &str = "
    SELECT ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT, ZCREATIONDATE, ZMODIFICATIONDATE, ZPINNED, ZTRASHED
    FROM ZSFNOTE
    WHERE ZTRASHED = 0 AND ZPINNED = 1
    ORDER BY ZCREATIONDATE DESC
";

const PINNED_BY_MODIFIED: &str = "
    SELECT ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT, ZCREATIONDATE, ZMODIFICATIONDATE, ZPINNED, ZTRASHED
    FROM ZSFNOTE
    WHERE ZTRASHED = 0 AND ZPINNED = 1
    ORDER BY ZMODIFICATIONDATE DESC
";

const CREATED_BETWEEN: &str = "
    SELECT ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT, ZCREATIONDATE, ZMODIFICATIONDATE, ZPINNED, ZTRASHED
    FROM ZSFNOTE
    WHERE ZTRASHED = 0 AND ZCREATIONDATE >= ? AND ZCREATIONDATE <= ?
    ORDER BY ZCREATIONDATE DESC
    LIMIT ?
";

const MODIFIED_BETWEEN: &str = "
    SELECT ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT, ZCREATIONDATE, ZMODIFICATIONDATE, ZPINNED, ZTRASHED
    FROM ZSFNOTE
    WHERE ZTRASHED = 0 AND ZMODIFICATIONDATE >= ? AND ZMODIFICATIONDATE <= ?
    ORDER BY ZMODIFICATIONDATE DESC
    LIMIT ?
";

/// One read operation against `ZSFNOTE`.
///
/// Trashed notes are excluded by every variant. Date bounds are Core Data
/// seconds, compared inclusively on both ends.
#[derive(Debug, Clone)]
pub enum NoteQuery {
    /// Exact match on title or note identifier.
    ByTitleOrId { query: String },
    /// Free-text and tag search, both filters optional.
    Search(SearchOptions),
    /// Notes whose body mentions `#tag`.
    ByTag { tag: String },
    /// Most recently modified notes.
    Recent { limit: u32, include_pinned: bool },
    /// Pinned notes, newest first by the given field.
    Pinned { sort: SortField },
    /// Notes whose timestamp falls inside `[start, end]`.
    DateRange {
        start: f64,
        end: f64,
        field: SortField,
        limit: u32,
    },
}

impl NoteQuery {
    /// The SQL template this query executes.
    pub fn sql(&self) -> &'static str {
        match self {
            Self::ByTitleOrId { .. } => BY_TITLE_OR_ID,
            Self::Search(options) => match (&options.term, &options.tag) {
                (Some(_), Some(_)) => MATCH_TERM_AND_TAG,
                (Some(_), None) => MATCH_TERM,
                (None, Some(_)) => MATCH_TAG,
                (None, None) => ALL_RECENT_FIRST,
            },
            Self::ByTag { .. } => MATCH_TAG,
            Self::Recent {
                include_pinned: true,
                ..
            } => ALL_RECENT_FIRST,
            Self::Recent {
                include_pinned: false,
                ..
            } => UNPINNED_RECENT_FIRST,
            Self::Pinned {
                sort: SortField::Created,
            } => PINNED_BY_CREATED,
            Self::Pinned {
                sort: SortField::Modified,
            } => PINNED_BY_MODIFIED,
            Self::DateRange {
                field: SortField::Created,
                ..
            } => CREATED_BETWEEN,
            Self::DateRange {
                field: SortField::Modified,
                ..
            } => MODIFIED_BETWEEN,
        }
    }

    /// Bound parameters, in template placeholder order.
    pub fn params(&self) -> Vec<Box<dyn ToSql>> {
        match self {
            Self::ByTitleOrId { query } => vec![Box::new(query.clone())],
            Self::Search(options) => {
                let mut params: Vec<Box<dyn ToSql>> = Vec::new();
                if let Some(term) = &options.term {
                    params.push(Box::new(format!("%{term}%")));
                }
                if let Some(tag) = &options.tag {
                    params.push(Box::new(tag_pattern(tag)));
                }
                params.push(Box::new(limit_or_unlimited(options.limit)));
                params
            }
            Self::ByTag { tag } => vec![Box::new(tag_pattern(tag)), Box::new(UNLIMITED)],
            Self::Recent { limit, .. } => vec![Box::new(i64::from(*limit))],
            Self::Pinned { .. } => Vec::new(),
            Self::DateRange {
                start, end, limit, ..
            } => vec![
                Box::new(*start),
                Box::new(*end),
                Box::new(i64::from(*limit)),
            ],
        }
    }
}

fn limit_or_unlimited(limit: Option<u32>) -> i64 {
    limit.map_or(UNLIMITED, i64::from)
}

/// `LIKE` pattern matching `#tag` anywhere in the body. Substring
/// semantics: filtering by `work` also matches `#workshop`.
fn tag_pattern(tag: &str) -> String {
    format!("%#{}%", normalize_tag(tag))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Bear note with its metadata resolved from the database row.
///
/// `tags` is always derived from `content` at load time, so the two never
/// disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Bear's stable note identifier (`ZUNIQUEIDENTIFIER`).
    pub id: String,
    pub title: String,
    pub content: String,
    pub creation_date: DateTime<Utc>,
    pub modification_date: DateTime<Utc>,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub is_trashed: bool,
}

/// Filters for note search. `term` and `tag` are independent; either, both,
/// or neither may be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Substring matched against title and body.
    pub term: Option<String>,
    /// Hashtag name, with or without the leading `#`.
    pub tag: Option<String>,
    /// Maximum rows to return; `None` means unlimited.
    pub limit: Option<u32>,
}

/// Which timestamp column ordering and date filters apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Created,
    Modified,
}

impl Default for SortField {
    fn default() -> Self {
        Self::Modified
    }
}

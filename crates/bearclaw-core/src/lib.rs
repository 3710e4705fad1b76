//! Core domain types for Bear's note store.
//!
//! Bear keeps notes in a Core Data backed SQLite database. This crate holds
//! the plain data model shared by the storage and MCP layers: [`Note`],
//! [`Tag`], hashtag extraction, and conversion between Core Data timestamps
//! and [`chrono`] datetimes. It knows nothing about SQL or MCP.

pub mod note;
pub mod tags;
pub mod timestamp;

pub use note::{Note, SearchOptions, SortField};
pub use tags::{count_tags, extract_tags, normalize_tag, Tag};
pub use timestamp::{to_datetime, to_native_seconds, CORE_DATA_EPOCH_UNIX_SECS};

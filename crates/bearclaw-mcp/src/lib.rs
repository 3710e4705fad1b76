//! MCP server for Bear notes.
//!
//! Reads go straight to Bear's SQLite database (read-only); writes go
//! through Bear's `x-callback-url` scheme, so the Bear app must be running
//! for them to take effect. Tool responses are Markdown text meant to be
//! shown to, or summarized by, an AI assistant.

pub mod format;
pub mod service;
pub mod xcallback;

pub use service::BearclawService;
pub use xcallback::{OpenLauncher, UrlLauncher, UrlSchemeResult, XCallbackClient};

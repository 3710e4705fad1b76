//! Locating the Bear database.
//!
//! Bear stores its database inside the app's group container under the
//! user's home directory; the path has been stable across Bear releases.
//! `BEAR_DB_PATH` overrides it for tests and unusual setups.

use std::path::PathBuf;

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "BEAR_DB_PATH";

/// Bear's SQLite store, relative to the user's home directory.
const BEAR_DB_RELATIVE: &str =
    "Library/Group Containers/9K33E3U3T4.net.shinyfrog.bear/Application Data/database.sqlite";

/// Where to find the Bear database.
#[derive(Debug, Clone)]
pub struct BearDbConfig {
    pub path: PathBuf,
}

impl BearDbConfig {
    /// Points at an explicit database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolves the database path from `BEAR_DB_PATH`, falling back to
    /// Bear's default location.
    pub fn from_env() -> Self {
        match std::env::var(DB_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::new(path),
            _ => Self::default(),
        }
    }
}

impl Default for BearDbConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: home.join(BEAR_DB_RELATIVE),
        }
    }
}

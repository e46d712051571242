//! Git history abstraction layer
//!
//! This module provides a trait-based abstraction over the git history
//! queries and mutations the release core needs, allowing for a real
//! implementation backed by the `git2` crate and a mock implementation
//! for testing.
//!
//! Most code should depend on the [History] trait rather than concrete
//! implementations; resolvers take their data sources as parameters so
//! tests can supply synthetic histories without process-wide setup.

pub mod mock;
pub mod repository;

pub use mock::MockHistory;
pub use repository::Git2History;

use chrono::{DateTime, Utc};

use crate::error::Result;

/// One commit as read from the log: raw message plus the paths it touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Full commit hash
    pub hash: String,
    pub authored_at: DateTime<Utc>,
    /// Complete raw commit message (subject and body)
    pub raw_message: String,
    /// Workspace-relative paths changed by this commit
    pub changed_paths: Vec<String>,
}

/// One tag as read from the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub name: String,
    /// Hash of the commit the tag points to
    pub commit_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Read and write access to git history.
///
/// History is treated as a local, fast, read-only data source except for
/// [History::create_tag] and [History::create_commit], which `apply` uses
/// to record a staged release.
pub trait History {
    /// List commits reachable from HEAD in chronological order (oldest
    /// first).
    ///
    /// # Arguments
    /// * `path_filter` - Keep only commits touching a path under this
    ///   prefix; `None` keeps everything
    /// * `since_hash` - Exclusive lower bound; `None` walks the entire
    ///   history
    fn list_commits(
        &self,
        path_filter: Option<&str>,
        since_hash: Option<&str>,
    ) -> Result<Vec<LogEntry>>;

    /// List tags, optionally filtered by a glob on the tag name.
    fn list_tags(&self, name_glob: Option<&str>) -> Result<Vec<TagEntry>>;

    /// Create a lightweight tag pointing at a commit.
    fn create_tag(&self, name: &str, commit_hash: &str) -> Result<()>;

    /// Stage the given paths and commit them on HEAD.
    ///
    /// # Returns
    /// The hash of the new commit.
    fn create_commit(&self, message: &str, paths: &[String]) -> Result<String>;
}

/// Prefix match on path component boundaries: "a/b" is under "a" but
/// "a-docs/b" is not.
pub(crate) fn path_is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    path == prefix || path.starts_with(&format!("{}/", prefix))
}

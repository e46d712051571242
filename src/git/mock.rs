use chrono::{DateTime, Utc};
use std::cell::RefCell;

use crate::error::{ReleaseError, Result};
use crate::git::{path_is_under, History, LogEntry, TagEntry};

/// Synthetic [History] for tests, populated commit by commit without a
/// real repository. Commits are held in chronological order (oldest first).
#[derive(Default)]
pub struct MockHistory {
    commits: Vec<LogEntry>,
    tags: RefCell<Vec<TagEntry>>,
}

impl MockHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit; later additions are newer.
    pub fn add_commit(&mut self, hash: &str, raw_message: &str, changed_paths: &[&str]) {
        let authored_at = DateTime::<Utc>::default()
            + chrono::Duration::seconds(self.commits.len() as i64);
        self.commits.push(LogEntry {
            hash: hash.to_string(),
            authored_at,
            raw_message: raw_message.to_string(),
            changed_paths: changed_paths.iter().map(|p| p.to_string()).collect(),
        });
    }

    pub fn add_tag(&mut self, name: &str, commit_hash: &str) {
        self.tags.borrow_mut().push(TagEntry {
            name: name.to_string(),
            commit_hash: commit_hash.to_string(),
            created_at: DateTime::<Utc>::default(),
        });
    }

    /// Tags created through the [History] interface, for assertions.
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.borrow().iter().map(|t| t.name.clone()).collect()
    }
}

/// Minimal glob match supporting a single '*' wildcard, which is all tag
/// name filters use.
fn glob_matches(glob: &str, name: &str) -> bool {
    match glob.split_once('*') {
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        }
        None => glob == name,
    }
}

impl History for MockHistory {
    fn list_commits(
        &self,
        path_filter: Option<&str>,
        since_hash: Option<&str>,
    ) -> Result<Vec<LogEntry>> {
        let start = match since_hash {
            Some(hash) => {
                let pos = self
                    .commits
                    .iter()
                    .position(|c| c.hash == hash)
                    .ok_or_else(|| {
                        ReleaseError::tag(format!("Unknown commit '{}'", hash))
                    })?;
                pos + 1
            }
            None => 0,
        };

        Ok(self.commits[start..]
            .iter()
            .filter(|entry| match path_filter {
                Some(prefix) => entry
                    .changed_paths
                    .iter()
                    .any(|p| path_is_under(p, prefix)),
                None => true,
            })
            .cloned()
            .collect())
    }

    fn list_tags(&self, name_glob: Option<&str>) -> Result<Vec<TagEntry>> {
        Ok(self
            .tags
            .borrow()
            .iter()
            .filter(|tag| match name_glob {
                Some(glob) => glob_matches(glob, &tag.name),
                None => true,
            })
            .cloned()
            .collect())
    }

    fn create_tag(&self, name: &str, commit_hash: &str) -> Result<()> {
        self.tags.borrow_mut().push(TagEntry {
            name: name.to_string(),
            commit_hash: commit_hash.to_string(),
            created_at: DateTime::<Utc>::default(),
        });
        Ok(())
    }

    fn create_commit(&self, _message: &str, _paths: &[String]) -> Result<String> {
        Ok(format!("mock{:036}", self.commits.len() + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commits_in_insertion_order() {
        let mut history = MockHistory::new();
        history.add_commit("a1", "feat: one", &["packages/core/a.rs"]);
        history.add_commit("a2", "fix: two", &["packages/api/b.rs"]);

        let all = history.list_commits(None, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].hash, "a1");
        assert!(all[0].authored_at < all[1].authored_at);
    }

    #[test]
    fn test_since_is_exclusive() {
        let mut history = MockHistory::new();
        history.add_commit("a1", "feat: one", &["x"]);
        history.add_commit("a2", "fix: two", &["y"]);

        let since = history.list_commits(None, Some("a1")).unwrap();
        assert_eq!(since.len(), 1);
        assert_eq!(since[0].hash, "a2");
    }

    #[test]
    fn test_unknown_since_hash_is_error() {
        let history = MockHistory::new();
        assert!(history.list_commits(None, Some("missing")).is_err());
    }

    #[test]
    fn test_path_filter() {
        let mut history = MockHistory::new();
        history.add_commit("a1", "feat: one", &["packages/core/a.rs"]);
        history.add_commit("a2", "fix: two", &["packages/api/b.rs"]);
        history.add_commit("a3", "chore: both", &["packages/core/c.rs", "packages/api/d.rs"]);

        let core = history.list_commits(Some("packages/core"), None).unwrap();
        let hashes: Vec<&str> = core.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, vec!["a1", "a3"]);
    }

    #[test]
    fn test_tag_glob_filter() {
        let mut history = MockHistory::new();
        history.add_tag("api-v1.0.0", "a1");
        history.add_tag("api-v1.1.0", "a2");
        history.add_tag("web-v2.0.0", "a3");

        let api = history.list_tags(Some("api-v*")).unwrap();
        assert_eq!(api.len(), 2);

        let all = history.list_tags(None).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_create_tag_visible_in_listing() {
        let history = MockHistory::new();
        history.create_tag("core-v0.1.0", "abc").unwrap();
        assert_eq!(history.tag_names(), vec!["core-v0.1.0"]);
    }
}

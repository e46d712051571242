//! The tag ledger: per-package release history as recorded in git tags.

use crate::config::CommitConfig;
use crate::domain::{Commit, ReleaseTag, TagPattern};
use crate::error::Result;
use crate::git::History;

/// Maps packages to their release tags and per-package commit ranges.
///
/// Tag names embed the package name, so the ledger can resolve independent
/// release histories out of a single shared git history.
pub struct TagLedger<'a, H: History> {
    history: &'a H,
    pattern: TagPattern,
}

impl<'a, H: History> TagLedger<'a, H> {
    pub fn new(history: &'a H, pattern: TagPattern) -> Self {
        TagLedger { history, pattern }
    }

    /// The most recent release tag for a package: the tag with the highest
    /// semantic version among tags scoped to it.
    ///
    /// `None` means the package has never been released. That is a seed
    /// state, not an error.
    pub fn latest_tag(&self, package: &str) -> Result<Option<ReleaseTag>> {
        let tags = self.history.list_tags(Some(&self.pattern.glob(package)))?;

        Ok(tags
            .into_iter()
            .filter_map(|tag| {
                let (parsed_package, version) = self.pattern.parse(&tag.name)?;
                if parsed_package != package {
                    return None;
                }
                Some(ReleaseTag {
                    package: parsed_package,
                    version,
                    commit_hash: tag.commit_hash,
                    created_at: tag.created_at,
                })
            })
            .max_by(|a, b| a.version.cmp(&b.version)))
    }

    /// Commits touching a package's path since its last release, oldest
    /// first, parsed into structured records.
    ///
    /// With `from = None` the range is the package's entire history. A
    /// monorepo-wide commit appears in the history of every package whose
    /// path it touches.
    pub fn commits_since(
        &self,
        package_path: &str,
        from: Option<&ReleaseTag>,
        config: &CommitConfig,
        extra_scopes: &[String],
    ) -> Result<Vec<Commit>> {
        let entries = self
            .history
            .list_commits(Some(package_path), from.map(|t| t.commit_hash.as_str()))?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                Commit::parse(
                    entry.hash,
                    entry.authored_at,
                    &entry.raw_message,
                    config,
                    extra_scopes,
                )
            })
            .collect())
    }
}

use chrono::DateTime;
use git2::{Oid, Repository};
use std::path::Path;

use crate::error::{ReleaseError, Result};
use crate::git::{path_is_under, History, LogEntry, TagEntry};

/// Real [History] implementation backed by the `git2` crate.
pub struct Git2History {
    repo: Repository,
}

impl Git2History {
    /// Open or discover a git repository at or above the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(Git2History { repo })
    }

    /// Resolve any revision spec (hash, short hash, branch, tag, `HEAD~2`)
    /// to a commit id.
    ///
    /// Revparse goes first: `Oid::from_str` zero-pads short hex strings into
    /// ids that exist nowhere in the repository, so it is only trusted for
    /// full-length hashes.
    fn resolve_rev(&self, rev: &str) -> Result<Oid> {
        match self.repo.revparse_single(rev) {
            Ok(object) => Ok(object.peel_to_commit()?.id()),
            Err(err) => {
                if rev.len() == 40 {
                    if let Ok(oid) = Oid::from_str(rev) {
                        return Ok(oid);
                    }
                }
                Err(err.into())
            }
        }
    }

    /// Paths touched by one commit, from a tree diff against the first
    /// parent (the whole tree for a root commit). Sorted and deduplicated.
    fn changed_paths(&self, commit: &git2::Commit<'_>) -> Result<Vec<String>> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut paths = Vec::new();
        diff.foreach(
            &mut |delta, _| {
                for file in [delta.old_file(), delta.new_file()] {
                    if let Some(path) = file.path() {
                        paths.push(path.to_string_lossy().to_string());
                    }
                }
                true
            },
            None,
            None,
            None,
        )?;

        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}

impl History for Git2History {
    fn list_commits(
        &self,
        path_filter: Option<&str>,
        since_hash: Option<&str>,
    ) -> Result<Vec<LogEntry>> {
        let since_oid = match since_hash {
            Some(rev) => Some(self.resolve_rev(rev)?),
            None => None,
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        // Hiding excludes the whole ancestry of the lower bound, so commits
        // on merged side branches stay in the range even when the walk order
        // puts them after the release commit.
        if let Some(oid) = since_oid {
            revwalk.hide(oid)?;
        }
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

        let mut entries = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            let changed_paths = self.changed_paths(&commit)?;

            if let Some(prefix) = path_filter {
                if !changed_paths.iter().any(|p| path_is_under(p, prefix)) {
                    continue;
                }
            }

            entries.push(LogEntry {
                hash: oid.to_string(),
                authored_at: DateTime::from_timestamp(commit.time().seconds(), 0)
                    .unwrap_or_default(),
                raw_message: commit.message().unwrap_or("").to_string(),
                changed_paths,
            });
        }

        // Revwalk yields newest first; the contract is oldest first.
        entries.reverse();
        Ok(entries)
    }

    fn list_tags(&self, name_glob: Option<&str>) -> Result<Vec<TagEntry>> {
        let names = self.repo.tag_names(name_glob)?;

        let mut tags = Vec::new();
        for name in names.iter().flatten() {
            let reference = match self.repo.find_reference(&format!("refs/tags/{}", name)) {
                Ok(r) => r,
                Err(_) => continue,
            };
            // Peel through annotated tags to the commit itself
            let object = reference
                .peel(git2::ObjectType::Commit)
                .map_err(|e| ReleaseError::tag(format!("Cannot peel tag '{}': {}", name, e)))?;

            let created_at = object
                .as_commit()
                .map(|c| DateTime::from_timestamp(c.time().seconds(), 0).unwrap_or_default())
                .unwrap_or_default();

            tags.push(TagEntry {
                name: name.to_string(),
                commit_hash: object.id().to_string(),
                created_at,
            });
        }

        Ok(tags)
    }

    fn create_tag(&self, name: &str, commit_hash: &str) -> Result<()> {
        let oid = Oid::from_str(commit_hash)?;
        let object = self
            .repo
            .find_object(oid, None)
            .map_err(|e| ReleaseError::tag(format!("Cannot find object: {}", e)))?;

        self.repo
            .tag_lightweight(name, &object, false)
            .map_err(|e| ReleaseError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn create_commit(&self, message: &str, paths: &[String]) -> Result<String> {
        let mut index = self.repo.index()?;
        for path in paths {
            index.add_path(Path::new(path))?;
        }
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        Ok(oid.to_string())
    }
}

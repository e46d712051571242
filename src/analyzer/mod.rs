//! Commit range analysis: mapping structured history to version bumps.

pub mod version_resolver;

pub use version_resolver::{bump_for_commit, resolve, BumpPolicy, ResolvedRelease};

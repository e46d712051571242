//! Core value types: commits, versions, and release tags.

pub mod commit;
pub mod tag;
pub mod version;

pub use commit::{Commit, CommitKind};
pub use tag::{ReleaseTag, TagPattern};
pub use version::{apply_bump, parse_version, VersionBump};

//! Deterministic version resolution from a package's commit range.

use semver::Version;

use crate::domain::{apply_bump, Commit, VersionBump};

/// Policy knobs for bump computation.
#[derive(Debug, Clone)]
pub struct BumpPolicy {
    /// Whether commits with an invalid scope still count toward the bump
    pub count_invalid_scopes: bool,
}

impl Default for BumpPolicy {
    fn default() -> Self {
        BumpPolicy {
            count_invalid_scopes: true,
        }
    }
}

/// A resolved next release for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelease {
    pub bump: VersionBump,
    pub next_version: Version,
}

/// The bump implied by a single commit.
///
/// Breaking commits are major regardless of type; `feat` is minor;
/// `fix` and `perf` are patch; every other configured type, and unknown,
/// implies no release.
pub fn bump_for_commit(commit: &Commit) -> VersionBump {
    if commit.is_breaking {
        return VersionBump::Major;
    }
    match commit.kind.as_known() {
        Some("feat") => VersionBump::Minor,
        Some("fix") | Some("perf") => VersionBump::Patch,
        _ => VersionBump::None,
    }
}

/// Resolve the next version for a package from its unreleased commits.
///
/// The package bump is the maximum bump over the counted commits. Returns
/// `None` ("no release needed") when a released package has no qualifying
/// commits; callers treat that as a no-op, not an error.
///
/// A never-released package always seeds at `0.1.0`, or `1.0.0` when any
/// counted commit is breaking, regardless of other commit content.
pub fn resolve(
    current: Option<&Version>,
    commits: &[Commit],
    policy: &BumpPolicy,
) -> Option<ResolvedRelease> {
    let mut bump = VersionBump::None;
    let mut any_breaking = false;

    for commit in commits {
        if !policy.count_invalid_scopes && !commit.scope_valid {
            continue;
        }
        bump = bump.max(bump_for_commit(commit));
        if commit.is_breaking {
            any_breaking = true;
        }
    }

    match current {
        None => {
            // Seed rule takes precedence over bump arithmetic.
            let next_version = if any_breaking {
                Version::new(1, 0, 0)
            } else {
                Version::new(0, 1, 0)
            };
            Some(ResolvedRelease {
                bump,
                next_version,
            })
        }
        Some(version) => {
            if bump == VersionBump::None {
                return None;
            }
            Some(ResolvedRelease {
                bump,
                next_version: apply_bump(version, bump),
            })
        }
    }
}

use crate::error::{ReleaseError, Result};
use semver::Version;

/// The kind of semantic version bump implied by a commit range.
///
/// Totally ordered: `None < Patch < Minor < Major`. A package's resolved
/// bump is the maximum bump implied by any commit in its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VersionBump {
    None,
    Patch,
    Minor,
    Major,
}

impl std::fmt::Display for VersionBump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VersionBump::None => "none",
            VersionBump::Patch => "patch",
            VersionBump::Minor => "minor",
            VersionBump::Major => "major",
        };
        write!(f, "{}", s)
    }
}

/// Parse a bare `X.Y.Z` version, tolerating a leading 'v' or 'V'.
///
/// # Returns
/// * `Ok(Version)` - Successfully parsed version
/// * `Err` - If the string is not a plain major.minor.patch triple
pub fn parse_version(s: &str) -> Result<Version> {
    let clean = s.trim_start_matches('v').trim_start_matches('V');
    Version::parse(clean)
        .map_err(|e| ReleaseError::version(format!("Invalid version '{}': {}", s, e)))
}

/// Apply a bump to a version.
///
/// Major version 0 carries no stability guarantee, so a major bump on a
/// pre-1.0 version increments the minor component instead.
pub fn apply_bump(current: &Version, bump: VersionBump) -> Version {
    match bump {
        VersionBump::Major if current.major == 0 => {
            Version::new(0, current.minor + 1, 0)
        }
        VersionBump::Major => Version::new(current.major + 1, 0, 0),
        VersionBump::Minor => Version::new(current.major, current.minor + 1, 0),
        VersionBump::Patch => Version::new(current.major, current.minor, current.patch + 1),
        VersionBump::None => current.clone(),
    }
}

use chrono::{DateTime, Utc};
use semver::Version;

use crate::error::{ReleaseError, Result};

/// A release tag recorded in version control, scoped to one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub package: String,
    pub version: Version,
    pub commit_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Tag naming pattern with `{package}` and `{version}` placeholders
/// (e.g. "{package}-v{version}" formats to "api-v1.2.3").
///
/// Tag names embed the package name so independently versioned packages can
/// share one git history.
#[derive(Debug, Clone)]
pub struct TagPattern {
    pattern: String,
}

impl TagPattern {
    /// Create a new tag pattern. Both placeholders must be present.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if !pattern.contains("{package}") || !pattern.contains("{version}") {
            return Err(ReleaseError::tag(
                "Tag pattern must contain {package} and {version} placeholders",
            ));
        }
        Ok(TagPattern { pattern })
    }

    /// Format a tag name for a package release.
    pub fn format(&self, package: &str, version: &Version) -> String {
        self.pattern
            .replace("{package}", package)
            .replace("{version}", &version.to_string())
    }

    /// Glob matching every tag of one package, for name-filtered tag listing.
    pub fn glob(&self, package: &str) -> String {
        self.pattern
            .replace("{package}", package)
            .replace("{version}", "*")
    }

    /// Parse a tag name back into (package, version).
    ///
    /// Returns `None` for tags that do not match the pattern, so unrelated
    /// tags in the repository are simply ignored.
    pub fn parse(&self, tag_name: &str) -> Option<(String, Version)> {
        let escaped = regex::escape(&self.pattern);
        let regex_pattern = escaped
            .replace(r"\{package\}", r"(?P<package>.+)")
            .replace(r"\{version\}", r"(?P<version>\d+\.\d+\.\d+)");

        let re = regex::Regex::new(&format!("^{}$", regex_pattern)).ok()?;
        let captures = re.captures(tag_name)?;

        let package = captures.name("package")?.as_str().to_string();
        let version = Version::parse(captures.name("version")?.as_str()).ok()?;
        Some((package, version))
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern {
            pattern: "{package}-v{version}".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_format() {
        let pattern = TagPattern::default();
        assert_eq!(
            pattern.format("api", &Version::new(1, 2, 3)),
            "api-v1.2.3"
        );
    }

    #[test]
    fn test_pattern_glob() {
        let pattern = TagPattern::default();
        assert_eq!(pattern.glob("api"), "api-v*");
    }

    #[test]
    fn test_pattern_parse() {
        let pattern = TagPattern::default();
        let (package, version) = pattern.parse("api-v1.2.3").unwrap();
        assert_eq!(package, "api");
        assert_eq!(version, Version::new(1, 2, 3));
    }

    #[test]
    fn test_pattern_parse_hyphenated_package() {
        let pattern = TagPattern::default();
        let (package, version) = pattern.parse("api-client-v0.4.0").unwrap();
        assert_eq!(package, "api-client");
        assert_eq!(version, Version::new(0, 4, 0));
    }

    #[test]
    fn test_pattern_parse_rejects_unrelated_tags() {
        let pattern = TagPattern::default();
        assert_eq!(pattern.parse("v1.2.3"), None);
        assert_eq!(pattern.parse("api-v1.2"), None);
        assert_eq!(pattern.parse("nightly-build"), None);
    }

    #[test]
    fn test_pattern_requires_placeholders() {
        assert!(TagPattern::new("v{version}").is_err());
        assert!(TagPattern::new("{package}-release").is_err());
        assert!(TagPattern::new("release/{package}/{version}").is_ok());
    }

    #[test]
    fn test_custom_pattern_roundtrip() {
        let pattern = TagPattern::new("release/{package}/{version}").unwrap();
        let name = pattern.format("web", &Version::new(2, 0, 1));
        assert_eq!(name, "release/web/2.0.1");
        assert_eq!(
            pattern.parse(&name),
            Some(("web".to_string(), Version::new(2, 0, 1)))
        );
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::domain::TagPattern;
use crate::error::{ReleaseError, Result};
use crate::workspace::PackageManifest;

/// Complete configuration for mono-release.
///
/// Loaded once per invocation and never mutated by the core.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub commits: CommitConfig,

    #[serde(default)]
    pub tags: TagConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

/// Returns the default list of conventional commit types.
fn default_commit_types() -> Vec<String> {
    vec![
        "feat".to_string(),
        "fix".to_string(),
        "docs".to_string(),
        "style".to_string(),
        "refactor".to_string(),
        "test".to_string(),
        "chore".to_string(),
        "build".to_string(),
        "ci".to_string(),
        "perf".to_string(),
    ]
}

/// Returns the default list of breaking change indicators.
fn default_breaking_change_indicators() -> Vec<String> {
    vec![
        "BREAKING CHANGE:".to_string(),
        "BREAKING-CHANGE:".to_string(),
    ]
}

fn default_min_subject_length() -> usize {
    3
}

fn default_max_subject_length() -> usize {
    72
}

fn default_count_invalid_scopes() -> bool {
    true
}

/// Configuration for commit message parsing and validation.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CommitConfig {
    #[serde(default = "default_commit_types")]
    pub types: Vec<String>,

    /// Extra valid scopes beyond package names
    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(default = "default_breaking_change_indicators")]
    pub breaking_change_indicators: Vec<String>,

    /// Branch name prefixes accepted by `check --branch`; empty disables the check
    #[serde(default)]
    pub branch_prefixes: Vec<String>,

    #[serde(default = "default_min_subject_length")]
    pub min_subject_length: usize,

    #[serde(default = "default_max_subject_length")]
    pub max_subject_length: usize,

    /// Whether commits with an invalid scope still count toward version bumps
    #[serde(default = "default_count_invalid_scopes")]
    pub count_invalid_scopes: bool,
}

impl Default for CommitConfig {
    fn default() -> Self {
        CommitConfig {
            types: default_commit_types(),
            scopes: Vec::new(),
            breaking_change_indicators: default_breaking_change_indicators(),
            branch_prefixes: Vec::new(),
            min_subject_length: default_min_subject_length(),
            max_subject_length: default_max_subject_length(),
            count_invalid_scopes: default_count_invalid_scopes(),
        }
    }
}

fn default_tag_pattern() -> String {
    "{package}-v{version}".to_string()
}

/// Configuration for release tag naming.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TagConfig {
    #[serde(default = "default_tag_pattern")]
    pub pattern: String,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            pattern: default_tag_pattern(),
        }
    }
}

/// Workspace package declarations (the manifest source).
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub packages: Vec<PackageManifest>,
}

impl Config {
    /// Build the tag pattern from configuration.
    pub fn tag_pattern(&self) -> Result<TagPattern> {
        TagPattern::new(&self.tags.pattern)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `monorelease.toml` in current directory
/// 3. `monorelease.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// A file that exists but cannot be read or parsed is a fatal configuration
/// error carrying the malformed field.
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./monorelease.toml").exists() {
        fs::read_to_string("./monorelease.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("monorelease.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str)
        .map_err(|e| ReleaseError::config(format!("Invalid configuration: {}", e)))
}

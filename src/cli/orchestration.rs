//! Release workflow orchestration, decoupled from argument parsing.
//!
//! `prepare` resolves versions and stages changelogs plus a plan file;
//! `apply` turns a staged plan into a release commit and tags. Both run one
//! full resolve-and-generate pass over declared inputs, so re-running
//! `prepare` before `apply` is safe.

use chrono::NaiveDate;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analyzer::{self, BumpPolicy};
use crate::changelog;
use crate::config::Config;
use crate::conventional::{self, Violation};
use crate::domain::VersionBump;
use crate::error::{ReleaseError, Result};
use crate::git::History;
use crate::ledger::TagLedger;
use crate::workspace::{self, AffectedSet, PackageGraph};

/// Where `prepare` stages the plan for `apply`.
pub const PLAN_FILE: &str = ".monorelease-plan.toml";

/// One package release resolved by `prepare`.
#[derive(Debug, Clone)]
pub struct PreparedRelease {
    pub package: String,
    pub path: String,
    pub previous_version: Option<Version>,
    pub next_version: Version,
    pub bump: VersionBump,
    pub tag_name: String,
    /// Full rendered changelog content for the package
    pub changelog: String,
}

/// The staged plan as persisted between `prepare` and `apply`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReleasePlanFile {
    pub releases: Vec<PlannedRelease>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedRelease {
    pub package: String,
    pub path: String,
    pub version: String,
    pub tag: String,
}

/// Resolve the next release for every package, in lexicographic package
/// order. Packages with no release needed are skipped.
pub fn plan_releases<H: History>(
    history: &H,
    config: &Config,
    graph: &PackageGraph,
    today: NaiveDate,
    root: &Path,
) -> Result<Vec<PreparedRelease>> {
    let pattern = config.tag_pattern()?;
    let ledger = TagLedger::new(history, pattern.clone());
    let extra_scopes = graph.package_names();
    let policy = BumpPolicy {
        count_invalid_scopes: config.commits.count_invalid_scopes,
    };

    let mut packages: Vec<_> = graph.packages().to_vec();
    packages.sort_by(|a, b| a.name.cmp(&b.name));

    let mut plan = Vec::new();
    for package in packages {
        let latest = ledger.latest_tag(&package.name)?;
        let commits = ledger.commits_since(
            &package.path,
            latest.as_ref(),
            &config.commits,
            &extra_scopes,
        )?;
        let current = latest.as_ref().map(|t| t.version.clone());

        let resolved = match analyzer::resolve(current.as_ref(), &commits, &policy) {
            Some(resolved) => resolved,
            None => continue,
        };

        let changelog_path = root.join(&package.path).join("CHANGELOG.md");
        let existing = fs::read_to_string(&changelog_path).ok();
        let content = changelog::generate(
            &package.name,
            &resolved.next_version,
            today,
            &commits,
            existing.as_deref(),
        );

        plan.push(PreparedRelease {
            tag_name: pattern.format(&package.name, &resolved.next_version),
            package: package.name,
            path: package.path,
            previous_version: current,
            next_version: resolved.next_version,
            bump: resolved.bump,
            changelog: content,
        });
    }

    Ok(plan)
}

/// Write the changelogs and the plan file for a resolved plan.
pub fn stage_plan(plan: &[PreparedRelease], root: &Path) -> Result<()> {
    for release in plan {
        let dir = root.join(&release.path);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("CHANGELOG.md"), &release.changelog)?;
    }

    let file = ReleasePlanFile {
        releases: plan
            .iter()
            .map(|r| PlannedRelease {
                package: r.package.clone(),
                path: r.path.clone(),
                version: r.next_version.to_string(),
                tag: r.tag_name.clone(),
            })
            .collect(),
    };
    let text = toml::to_string_pretty(&file)
        .map_err(|e| ReleaseError::config(format!("Cannot serialize release plan: {}", e)))?;
    fs::write(root.join(PLAN_FILE), text)?;
    Ok(())
}

/// Load the staged plan written by `prepare`.
pub fn load_plan(root: &Path) -> Result<ReleasePlanFile> {
    let path = root.join(PLAN_FILE);
    if !path.exists() {
        return Err(ReleaseError::config(
            "No staged release plan found; run `prepare` first",
        ));
    }
    let text = fs::read_to_string(path)?;
    toml::from_str(&text)
        .map_err(|e| ReleaseError::config(format!("Invalid release plan: {}", e)))
}

/// Result of applying a staged plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedRelease {
    pub commit_hash: String,
    pub tags: Vec<String>,
}

/// Commit the staged changelogs and tag each released package, then remove
/// the plan file.
pub fn apply_plan<H: History>(history: &H, root: &Path) -> Result<AppliedRelease> {
    let plan = load_plan(root)?;
    if plan.releases.is_empty() {
        return Err(ReleaseError::config("Staged release plan is empty"));
    }

    let files: Vec<String> = plan
        .releases
        .iter()
        .map(|r| format!("{}/CHANGELOG.md", r.path.trim_end_matches('/')))
        .collect();

    let mut message = String::from("chore(release): publish\n");
    for release in &plan.releases {
        message.push_str(&format!("\n- {} {}", release.package, release.version));
    }

    let commit_hash = history.create_commit(&message, &files)?;

    let mut tags = Vec::new();
    for release in &plan.releases {
        history.create_tag(&release.tag, &commit_hash)?;
        tags.push(release.tag.clone());
    }

    fs::remove_file(root.join(PLAN_FILE))?;

    Ok(AppliedRelease { commit_hash, tags })
}

/// Union of paths changed by all commits since a ref, sorted and deduplicated.
pub fn changed_paths_since<H: History>(history: &H, since: Option<&str>) -> Result<Vec<String>> {
    let entries = history.list_commits(None, since)?;
    let mut paths: Vec<String> = entries
        .into_iter()
        .flat_map(|e| e.changed_paths)
        .collect();
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Resolve the affected set from explicit paths and/or a git ref range.
pub fn affected_packages<H: History>(
    history: &H,
    graph: &PackageGraph,
    since: Option<&str>,
    explicit_paths: &[String],
) -> Result<AffectedSet> {
    let mut paths = explicit_paths.to_vec();
    if let Some(reference) = since {
        paths.extend(changed_paths_since(history, Some(reference))?);
    }
    if paths.is_empty() && since.is_none() {
        return Err(ReleaseError::config(
            "Nothing to resolve: pass --since <ref> or --path <file>",
        ));
    }
    Ok(workspace::resolve_affected(graph, &paths))
}

/// Validate all commit messages since a ref. Returns only offending
/// commits, each with its full violation list.
pub fn check_commits<H: History>(
    history: &H,
    config: &Config,
    graph: &PackageGraph,
    since: Option<&str>,
) -> Result<Vec<(String, Vec<Violation>)>> {
    let extra_scopes = graph.package_names();
    let entries = history.list_commits(None, since)?;

    Ok(entries
        .into_iter()
        .map(|e| {
            let violations = conventional::validate(&e.raw_message, &config.commits, &extra_scopes);
            (e.hash, violations)
        })
        .filter(|(_, violations)| !violations.is_empty())
        .collect())
}

//! Changelog generation with idempotent merging.
//!
//! A section is rendered per released version and merged into the existing
//! changelog: new versions are prepended above older sections, and a section
//! for an already-recorded version is replaced in place. Regenerating with
//! identical inputs yields byte-identical output, which is what makes
//! re-running `prepare` before `apply` safe.

use chrono::NaiveDate;
use semver::Version;

use crate::domain::{Commit, CommitKind};

const GROUP_TITLES: [&str; 4] = ["Breaking Changes", "Features", "Fixes", "Other"];

/// Generate the changelog content for a package release.
///
/// Commits are grouped into a fixed section order; breaking commits always
/// surface under Breaking Changes regardless of their type. Within a group,
/// chronological commit order is preserved.
pub fn generate(
    package: &str,
    version: &Version,
    date: NaiveDate,
    commits: &[Commit],
    existing: Option<&str>,
) -> String {
    let new_section = render_section(version, date, commits);

    let existing = existing.unwrap_or("").trim_end();
    if existing.is_empty() {
        return format!("# Changelog - {}\n\n{}\n", package, new_section);
    }

    let (preamble, mut sections) = split_sections(existing);

    let version_str = version.to_string();
    match sections
        .iter()
        .position(|s| section_version(s) == Some(version_str.as_str()))
    {
        Some(idx) => sections[idx] = new_section,
        None => sections.insert(0, new_section),
    }

    let mut out = preamble;
    for section in &sections {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(section);
    }
    out.push('\n');
    out
}

/// Render one version section, without trailing newline.
fn render_section(version: &Version, date: NaiveDate, commits: &[Commit]) -> String {
    let mut groups: [Vec<&Commit>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];

    for commit in commits {
        let group = if commit.is_breaking {
            0
        } else {
            match commit.kind.as_known() {
                Some("feat") => 1,
                Some("fix") | Some("perf") => 2,
                _ => 3,
            }
        };
        groups[group].push(commit);
    }

    let mut lines = vec![format!("## {} ({})", version, date.format("%Y-%m-%d"))];

    for (title, group) in GROUP_TITLES.iter().zip(groups.iter()) {
        if group.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("### {}", title));
        lines.push(String::new());
        for commit in group {
            lines.push(render_bullet(commit));
        }
    }

    lines.join("\n")
}

fn render_bullet(commit: &Commit) -> String {
    match &commit.scope {
        Some(scope) => format!("- **{}**: {} ({})", scope, commit.subject, commit.short_hash()),
        None => format!("- {} ({})", commit.subject, commit.short_hash()),
    }
}

/// Split existing content into preamble (title block) and version sections.
/// Each section begins at a line starting with `## `.
fn split_sections(text: &str) -> (String, Vec<String>) {
    let mut preamble = String::new();
    let mut sections: Vec<String> = Vec::new();

    for line in text.lines() {
        if line.starts_with("## ") {
            sections.push(line.to_string());
        } else if let Some(current) = sections.last_mut() {
            current.push('\n');
            current.push_str(line);
        } else {
            if !preamble.is_empty() {
                preamble.push('\n');
            }
            preamble.push_str(line);
        }
    }

    (
        preamble.trim_end().to_string(),
        sections.into_iter().map(|s| s.trim_end().to_string()).collect(),
    )
}

/// The version a section records, from its `## X.Y.Z (date)` header.
fn section_version(section: &str) -> Option<&str> {
    let header = section.lines().next()?;
    let rest = header.strip_prefix("## ")?;
    Some(rest.split_whitespace().next().unwrap_or(rest))
}

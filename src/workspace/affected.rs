//! Affected-package resolution for CI fan-out.
//!
//! A package is directly changed when a modified file falls under its path;
//! every package that transitively depends on a changed package is affected
//! too. Results are computed fresh per invocation and never persisted.

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

use crate::workspace::PackageGraph;

/// Why a package landed in the affected set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AffectedReason {
    /// A file under the package's path changed
    DirectlyChanged,
    /// Depends, directly or indirectly, on a directly changed package
    TransitivelyAffected,
}

/// The set of affected packages, ordered lexicographically by name so
/// serialized output is stable across runs with identical inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AffectedSet {
    entries: BTreeMap<String, AffectedReason>,
    /// Changed paths that matched no package. Workspace-root files
    /// legitimately affect nothing; reported as warnings, never fatal.
    unclaimed_paths: Vec<String>,
}

impl AffectedSet {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn reason(&self, name: &str) -> Option<AffectedReason> {
        self.entries.get(name).copied()
    }

    /// Package names in stable lexicographic order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AffectedReason)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn unclaimed_paths(&self) -> &[String] {
        &self.unclaimed_paths
    }
}

/// Resolve the affected set for a list of changed file paths.
///
/// Direct ownership uses longest-prefix matching (the deepest package claims
/// nested paths), then affectedness propagates breadth-first over the
/// reverse-dependency index until fixpoint.
pub fn resolve(graph: &PackageGraph, changed_paths: &[String]) -> AffectedSet {
    let mut entries: BTreeMap<String, AffectedReason> = BTreeMap::new();
    let mut unclaimed: Vec<String> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();

    for path in changed_paths {
        match graph.owner_of(path) {
            Some(package) => {
                if entries
                    .insert(package.name.clone(), AffectedReason::DirectlyChanged)
                    .is_none()
                {
                    if let Some(idx) = graph.index_of(&package.name) {
                        queue.push_back(idx);
                    }
                }
            }
            None => unclaimed.push(path.clone()),
        }
    }

    while let Some(idx) = queue.pop_front() {
        for &dependent in graph.dependent_indices(idx) {
            let name = &graph.package_at(dependent).name;
            if !entries.contains_key(name) {
                entries.insert(name.clone(), AffectedReason::TransitivelyAffected);
                queue.push_back(dependent);
            }
        }
    }

    unclaimed.sort();
    unclaimed.dedup();

    AffectedSet {
        entries,
        unclaimed_paths: unclaimed,
    }
}

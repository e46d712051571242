use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ReleaseError, Result};

/// One package as declared by the workspace manifest source.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    /// Unique package name
    pub name: String,
    /// Workspace-relative path owning the package's files
    pub path: String,
    /// Names of other workspace packages this one depends on
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Directed acyclic graph of workspace packages with a precomputed
/// reverse-dependency index (who depends on me).
///
/// Construction rejects cyclic internal dependencies; a partially built
/// graph is never observable.
#[derive(Debug)]
pub struct PackageGraph {
    packages: Vec<PackageManifest>,
    index: HashMap<String, usize>,
    dependents: Vec<Vec<usize>>,
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

impl PackageGraph {
    /// Build the graph from workspace manifests.
    ///
    /// Fails with [ReleaseError::CyclicDependency] carrying the ordered
    /// cycle, or with a configuration error for duplicate names and
    /// references to unknown packages.
    pub fn build(manifests: Vec<PackageManifest>) -> Result<Self> {
        let mut index = HashMap::new();
        for (i, manifest) in manifests.iter().enumerate() {
            if index.insert(manifest.name.clone(), i).is_some() {
                return Err(ReleaseError::config(format!(
                    "Duplicate package name '{}'",
                    manifest.name
                )));
            }
        }

        // Forward edges: package -> its dependencies
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); manifests.len()];
        for (i, manifest) in manifests.iter().enumerate() {
            for dep in &manifest.dependencies {
                let dep_idx = index.get(dep).copied().ok_or_else(|| {
                    ReleaseError::config(format!(
                        "Package '{}' depends on unknown package '{}'",
                        manifest.name, dep
                    ))
                })?;
                adjacency[i].push(dep_idx);
            }
        }

        if let Some(cycle) = find_cycle(&adjacency) {
            let names = cycle
                .into_iter()
                .map(|i| manifests[i].name.clone())
                .collect();
            return Err(ReleaseError::CyclicDependency(names));
        }

        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); manifests.len()];
        for (i, deps) in adjacency.iter().enumerate() {
            for &dep_idx in deps {
                dependents[dep_idx].push(i);
            }
        }

        Ok(PackageGraph {
            packages: manifests,
            index,
            dependents,
        })
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages in declaration order.
    pub fn packages(&self) -> &[PackageManifest] {
        &self.packages
    }

    /// Package names sorted lexicographically, e.g. for scope validation.
    pub fn package_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.packages.iter().map(|p| p.name.clone()).collect();
        names.sort();
        names
    }

    pub fn get(&self, name: &str) -> Option<&PackageManifest> {
        self.index.get(name).map(|&i| &self.packages[i])
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn package_at(&self, idx: usize) -> &PackageManifest {
        &self.packages[idx]
    }

    pub(crate) fn dependent_indices(&self, idx: usize) -> &[usize] {
        &self.dependents[idx]
    }

    /// The package owning a changed path, if any.
    ///
    /// Ownership is longest-prefix: when package paths nest, the deepest
    /// matching package claims the file. Workspace-root files that fall
    /// under no package return `None`.
    pub fn owner_of(&self, changed_path: &str) -> Option<&PackageManifest> {
        self.packages
            .iter()
            .filter(|p| {
                let prefix = p.path.trim_end_matches('/');
                changed_path == prefix
                    || changed_path.starts_with(&format!("{}/", prefix))
            })
            .max_by_key(|p| p.path.trim_end_matches('/').len())
    }
}

/// Iterative white/gray/black DFS cycle search over the forward edges.
///
/// Returns the cycle as an ordered list of node indices, or `None` when the
/// graph is acyclic. Explicit stack keeps cycle reporting deterministic and
/// avoids unbounded recursion on large graphs.
fn find_cycle(adjacency: &[Vec<usize>]) -> Option<Vec<usize>> {
    let mut color = vec![Color::White; adjacency.len()];

    for start in 0..adjacency.len() {
        if color[start] != Color::White {
            continue;
        }

        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        let mut path: Vec<usize> = vec![start];
        color[start] = Color::Gray;

        while let Some(frame) = stack.last_mut() {
            let (node, next_child) = *frame;
            if next_child < adjacency[node].len() {
                frame.1 += 1;
                let child = adjacency[node][next_child];
                match color[child] {
                    Color::Gray => {
                        // Back edge: the cycle is the path tail from the
                        // first occurrence of the revisited node.
                        let pos = path.iter().position(|&p| p == child).unwrap_or(0);
                        return Some(path[pos..].to_vec());
                    }
                    Color::White => {
                        color[child] = Color::Gray;
                        path.push(child);
                        stack.push((child, 0));
                    }
                    Color::Black => {}
                }
            } else {
                color[node] = Color::Black;
                path.pop();
                stack.pop();
            }
        }
    }

    None
}

//! Workspace package discovery: the dependency graph and affected-set
//! resolution built on top of it.

pub mod affected;
pub mod graph;

pub use affected::{resolve as resolve_affected, AffectedReason, AffectedSet};
pub use graph::{PackageGraph, PackageManifest};

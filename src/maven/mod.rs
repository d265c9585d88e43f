//! Maven project resolution
//!
//! This module provides functionality to:
//! - Decode pom.xml descriptors through a normalized structural map
//! - Link descriptors into parent/child trees
//! - Substitute `${...}` properties and report unused ones
//! - Reconcile declared coordinates against the build tool's resolution
//!
//! Maven dependency names are `groupId/artifactId`.

mod descriptor;
mod hierarchy;
mod properties;
mod reconcile;
mod report;
mod xml;

pub use descriptor::{ProjectDescriptor, ProjectModel, DEFAULT_PLUGIN_GROUP};
pub use hierarchy::ProjectGraph;
pub use properties::RESERVED_PROPERTY;
pub use report::{BuildReport, ResolvedArtifact, RESOLVED_BANNER, SUCCESS_MARKER};

use crate::domain::{Ecosystem, Issues, Resolution};
use crate::error::{ManifestError, ResolveError};
use crate::manifest::{ManifestResolver, ResolveResult, ResolverContext};
use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

/// Resolver for pom.xml files
///
/// Resolving one file also loads every module it aggregates, recursively,
/// so that the module tree can be linked and reconciled together.
pub struct MavenResolver;

/// Result of resolving one descriptor tree
#[derive(Debug)]
pub struct TreeOutcome {
    /// Descriptor at the root of the tree
    pub root: PathBuf,
    /// Resolution of the whole tree
    pub result: ResolveResult,
}

impl ManifestResolver for MavenResolver {
    fn resolve(&self, ctx: &ResolverContext, path: &Path, include_test: bool) -> ResolveResult {
        let descriptors =
            load_with_modules(ctx, path).map_err(|e| ResolveError::new(e, Issues::new()))?;
        let graph = ProjectGraph::build(descriptors);

        let mut merged = Resolution::default();
        for root in graph.roots() {
            match reconcile::resolve_tree(ctx, &graph, root, include_test) {
                Ok(resolution) => merged.merge(resolution),
                Err(mut e) => {
                    let mut issues = merged.issues;
                    issues.append(e.issues);
                    e.issues = issues.sorted();
                    return Err(e);
                }
            }
        }
        Ok(merged)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }
}

/// Resolve a set of pom.xml files together
///
/// Descriptors are linked across the whole set, so a parent in one
/// directory and its children in others form one tree. Each tree succeeds
/// or fails on its own; a file that cannot be decoded fails alone.
pub fn resolve_project_set(
    ctx: &ResolverContext,
    paths: &[PathBuf],
    include_test: bool,
) -> Vec<TreeOutcome> {
    let mut outcomes = Vec::new();
    let mut descriptors = Vec::new();

    for path in paths {
        match load_descriptor(ctx, path) {
            Ok(descriptor) => descriptors.push(descriptor),
            Err(e) => outcomes.push(TreeOutcome {
                root: path.clone(),
                result: Err(ResolveError::new(e, Issues::new())),
            }),
        }
    }

    let graph = ProjectGraph::build(descriptors);
    tracing::debug!(descriptors = graph.len(), roots = graph.roots().len(), "linked project set");

    for root in graph.roots() {
        outcomes.push(TreeOutcome {
            root: graph.descriptor(root).path.clone(),
            result: reconcile::resolve_tree(ctx, &graph, root, include_test),
        });
    }
    outcomes
}

fn load_descriptor(ctx: &ResolverContext, path: &Path) -> Result<ProjectDescriptor, ManifestError> {
    let xml = ctx.read_text(path)?;
    ProjectDescriptor::parse(path, &xml)
}

fn load_with_modules(
    ctx: &ResolverContext,
    path: &Path,
) -> Result<Vec<ProjectDescriptor>, ManifestError> {
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([path.to_path_buf()]);
    let mut descriptors = Vec::new();

    while let Some(next) = queue.pop_front() {
        if !seen.insert(next.clone()) {
            continue;
        }
        let descriptor = load_descriptor(ctx, &next)?;
        queue.extend(descriptor.module_paths());
        descriptors.push(descriptor);
    }
    Ok(descriptors)
}

//! Reconciliation of declared Maven coordinates against ground truth
//!
//! Walks each tree depth-first from its root. At every descriptor the
//! inherited dependency-management table is overlaid with the descriptor's
//! own entries, the build tool is run in the descriptor's directory, and
//! each candidate coordinate is corrected first by the management table and
//! then by the tool's resolved version.

use super::descriptor::{ProjectModel, DEFAULT_PLUGIN_GROUP};
use super::hierarchy::ProjectGraph;
use super::properties::{substitute_descriptor, unused_variables};
use super::report::BuildReport;
use crate::domain::{Dependencies, Dependency, Ecosystem, Issue, Issues, Resolution};
use crate::error::{BuildToolError, ResolveError};
use crate::manifest::{ResolveResult, ResolverContext};
use std::collections::{BTreeMap, BTreeSet};

/// Dependency name to managed version, nearest declaration winning
pub type ManagementTable = BTreeMap<String, String>;

/// A coordinate declared by a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub version: String,
}

impl Candidate {
    fn new(group: &str, artifact: &str, version: &str) -> Option<Self> {
        let (group, artifact) = (group.trim(), artifact.trim());
        if artifact.is_empty() {
            return None;
        }
        Some(Self {
            name: format!("{}/{}", group, artifact).to_lowercase(),
            version: version.trim().to_lowercase(),
        })
    }
}

/// Collect the candidate coordinates of a substituted descriptor
pub fn candidates(model: &ProjectModel, include_test: bool) -> Vec<Candidate> {
    let in_scope = |scope: &str| include_test || !scope.trim().eq_ignore_ascii_case("test");
    let mut found = Vec::new();

    for dep in &model.dependencies.dependency {
        if in_scope(dep.scope.as_str()) {
            found.extend(Candidate::new(&dep.group_id, &dep.artifact_id, &dep.version));
        }
    }

    let plugins = model
        .build
        .plugins
        .plugin
        .iter()
        .chain(model.build.plugin_management.plugins.plugin.iter());
    for plugin in plugins {
        let group = if plugin.group_id.trim().is_empty() {
            DEFAULT_PLUGIN_GROUP
        } else {
            plugin.group_id.as_str()
        };
        found.extend(Candidate::new(group, &plugin.artifact_id, &plugin.version));
    }

    if let Some(parent) = &model.parent {
        found.extend(Candidate::new(
            &parent.group_id,
            &parent.artifact_id,
            &parent.version,
        ));
    }

    for managed in model.managed_dependencies() {
        if in_scope(managed.scope.as_str()) {
            found.extend(Candidate::new(
                &managed.group_id,
                &managed.artifact_id,
                &managed.version,
            ));
        }
    }

    found
}

/// Overlay a descriptor's own managed versions on the inherited table
pub fn management_table(inherited: &ManagementTable, model: &ProjectModel) -> ManagementTable {
    let mut table = inherited.clone();
    for managed in model.managed_dependencies() {
        if let Some(candidate) =
            Candidate::new(&managed.group_id, &managed.artifact_id, &managed.version)
        {
            if !candidate.version.is_empty() {
                table.insert(candidate.name, candidate.version);
            }
        }
    }
    table
}

/// Apply the management override, then the resolved version
pub fn reconcile(
    candidate: &Candidate,
    table: &ManagementTable,
    report: Option<&BuildReport>,
    issues: &mut Issues,
) -> Dependency {
    let mut version = candidate.version.clone();

    let corrections = [
        table.get(&candidate.name).map(String::as_str),
        report.and_then(|r| r.version_of(&candidate.name)),
    ];
    for corrected in corrections.into_iter().flatten() {
        if !corrected.eq_ignore_ascii_case(&version) {
            issues.push(Issue::version_mismatch(&candidate.name, &version, corrected));
            version = corrected.to_lowercase();
        }
    }

    if version.is_empty() {
        issues.push(Issue::missing_version(&candidate.name));
    }
    Dependency::new(&candidate.name, &version, Ecosystem::Maven)
}

/// Resolve the tree rooted at `root`
pub fn resolve_tree(
    ctx: &ResolverContext,
    graph: &ProjectGraph,
    root: usize,
    include_test: bool,
) -> ResolveResult {
    let mut issues = Issues::new();
    let mut models = BTreeMap::new();
    let mut used_by: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();

    for index in graph.subtree(root) {
        let substituted = substitute_descriptor(graph, index)
            .map_err(|e| ResolveError::new(e, issues.clone().sorted()))?;
        used_by.insert(index, substituted.used);
        models.insert(index, substituted.model);
    }

    let mut walk = TreeWalk {
        ctx,
        graph,
        models: &models,
        used_by: &used_by,
        include_test,
        dependencies: Dependencies::new(),
        issues: &mut issues,
    };
    walk.visit(root, &ManagementTable::new(), None)
        .map_err(|e| ResolveError::new(e, walk.issues.clone().sorted()))?;

    let dependencies = walk.dependencies;
    Ok(Resolution::new(dependencies, issues))
}

struct TreeWalk<'a> {
    ctx: &'a ResolverContext,
    graph: &'a ProjectGraph,
    models: &'a BTreeMap<usize, ProjectModel>,
    used_by: &'a BTreeMap<usize, BTreeSet<String>>,
    include_test: bool,
    dependencies: Dependencies,
    issues: &'a mut Issues,
}

impl TreeWalk<'_> {
    fn visit(
        &mut self,
        index: usize,
        inherited: &ManagementTable,
        inherited_report: Option<&BuildReport>,
    ) -> Result<(), BuildToolError> {
        let (graph, models) = (self.graph, self.models);
        let descriptor = graph.descriptor(index);
        let model = &models[&index];
        tracing::debug!(path = %descriptor.path.display(), "resolving project descriptor");

        for issue in unused_variables(graph, index, self.used_by) {
            self.issues.push(issue);
        }

        let table = management_table(inherited, model);

        let own_report = match self.run_tool(index) {
            Ok(report) => Some(report),
            Err(e) if graph.parent(index).is_none() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    path = %descriptor.path.display(),
                    error = %e,
                    "build tool failed; falling back to nearest ancestor resolution"
                );
                self.issues.push(Issue::tool_failure(
                    &descriptor.path.display().to_string(),
                    &e.to_string(),
                ));
                None
            }
        };
        let report = own_report.as_ref().or(inherited_report);

        for candidate in candidates(model, self.include_test) {
            let dep = reconcile(&candidate, &table, report, self.issues);
            self.dependencies.push(dep);
        }

        for &child in graph.children(index) {
            self.visit(child, &table, report)?;
        }
        Ok(())
    }

    fn run_tool(&self, index: usize) -> Result<BuildReport, BuildToolError> {
        let dir = self.graph.descriptor(index).project_dir();
        let output = self
            .ctx
            .tool_lock()
            .run(|| self.ctx.build_tool().resolve(dir))??;
        BuildReport::parse(dir, &output)
    }
}

//! `${...}` property resolution for project descriptors
//!
//! A descriptor's effective properties are its own merged over those of its
//! ancestors, nearest declaration winning. Substitution runs over the whole
//! serialized descriptor and records every declared key it consumed, which
//! is what the unused-variable check is based on.

use super::descriptor::ProjectModel;
use super::hierarchy::ProjectGraph;
use crate::domain::Issue;
use crate::error::ManifestError;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Property that build tools read implicitly; never reported as unused
pub const RESERVED_PROPERTY: &str = "project.build.sourceEncoding";

// Nested property values are expanded on later passes, up to this bound
const MAX_PASSES: usize = 10;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Variables available when substituting one descriptor
#[derive(Debug, Clone, Default)]
pub struct Variables {
    declared: BTreeMap<String, String>,
    builtin: BTreeMap<String, String>,
}

impl Variables {
    /// Collect the variables in effect for the descriptor at `index`
    pub fn for_descriptor(graph: &ProjectGraph, index: usize) -> Self {
        let mut declared = BTreeMap::new();
        for ancestor in graph.ancestors(index).into_iter().rev() {
            declared.extend(graph.descriptor(ancestor).model.properties.clone());
        }
        let model = &graph.descriptor(index).model;
        declared.extend(model.properties.clone());

        let mut builtin = BTreeMap::new();
        let mut define = |key: &str, value: &str| {
            if !value.is_empty() {
                builtin.insert(format!("project.{}", key), value.to_string());
                builtin.insert(format!("pom.{}", key), value.to_string());
            }
        };
        define("groupId", graph.group(index));
        define("artifactId", &model.artifact_id);
        define("version", model.effective_version());
        if let Some(parent) = &model.parent {
            define("parent.groupId", &parent.group_id);
            define("parent.version", &parent.version);
        }

        Self { declared, builtin }
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.builtin
            .get(key)
            .or_else(|| self.declared.get(key))
            .map(String::as_str)
    }

    fn is_declared(&self, key: &str) -> bool {
        !self.builtin.contains_key(key) && self.declared.contains_key(key)
    }
}

/// A descriptor after substitution, with the declared keys it consumed
#[derive(Debug, Clone)]
pub struct Substituted {
    pub model: ProjectModel,
    pub used: BTreeSet<String>,
}

/// Replace every resolvable `${key}` across the serialized descriptor
///
/// Unresolvable placeholders are left verbatim.
pub fn substitute(model: &ProjectModel, variables: &Variables) -> Result<Substituted, String> {
    let mut text = serde_json::to_string(model).map_err(|e| e.to_string())?;
    let mut used = BTreeSet::new();

    for _ in 0..MAX_PASSES {
        let mut replaced = false;
        let next = PLACEHOLDER_RE.replace_all(&text, |caps: &Captures| {
            let key = &caps[1];
            match variables.lookup(key) {
                Some(value) => {
                    if variables.is_declared(key) {
                        used.insert(key.to_string());
                    }
                    replaced = true;
                    json_escape(value)
                }
                None => caps[0].to_string(),
            }
        });
        let next = next.into_owned();
        if !replaced || next == text {
            text = next;
            break;
        }
        text = next;
    }

    let model = serde_json::from_str(&text).map_err(|e| e.to_string())?;
    Ok(Substituted { model, used })
}

fn json_escape(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Substitute the descriptor at `index`, mapping failures to its path
pub fn substitute_descriptor(
    graph: &ProjectGraph,
    index: usize,
) -> Result<Substituted, ManifestError> {
    let descriptor = graph.descriptor(index);
    let variables = Variables::for_descriptor(graph, index);
    substitute(&descriptor.model, &variables).map_err(|message| {
        ManifestError::xml_parse_error(&descriptor.path, format!("property substitution: {}", message))
    })
}

/// Unused-variable issues for the descriptor at `index`
///
/// A declared property counts as used when the substitution pass of the
/// descriptor or any of its descendants consumed it.
pub fn unused_variables(
    graph: &ProjectGraph,
    index: usize,
    used_by: &BTreeMap<usize, BTreeSet<String>>,
) -> Vec<Issue> {
    let descriptor = graph.descriptor(index);
    let used: BTreeSet<&str> = graph
        .subtree(index)
        .into_iter()
        .filter_map(|i| used_by.get(&i))
        .flatten()
        .map(String::as_str)
        .collect();

    descriptor
        .model
        .properties
        .keys()
        .filter(|key| key.as_str() != RESERVED_PROPERTY && !used.contains(key.as_str()))
        .map(|key| Issue::unused_variable(key, &descriptor.path.display().to_string()))
        .collect()
}

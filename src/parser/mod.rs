//! Declaration parsers shared by the manifest resolvers
//!
//! This module provides parsers for single declarations in:
//! - pip requirement lines (`name==1.0`, VCS URLs)
//! - npm version specs (`^1.2.3`, `>=1.0`)
//! - Conda package specs (`numpy=1.14.0=py27_0`, recipe entries)

mod conda;
mod node;
mod python;
mod vcs;

pub use conda::{split_recipe_entry, CondaSpecParser};
pub use node::parse_version_spec;
pub use python::{parse_pip_line, PipLine, PipRequirementParser};
pub use vcs::{parse_vcs_reference, VcsReference};

use crate::domain::{Dependency, Ecosystem, Issue};

/// How tightly a declaration pins its version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Pinned to exactly one version
    Exact,
    /// Bound by the given comparator (`>=`, `^`, ...)
    Weak(String),
    /// No version declared
    Missing,
}

/// A single parsed declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Package name as declared
    pub name: String,
    /// Bare version with any comparator stripped
    pub version: String,
    /// Constraint kind
    pub constraint: Constraint,
}

impl Requirement {
    /// Creates a requirement, classifying an empty version as missing
    pub fn new(name: impl Into<String>, version: impl Into<String>, constraint: Constraint) -> Self {
        let version = version.into().trim().to_string();
        let constraint = if version.is_empty() && constraint == Constraint::Exact {
            Constraint::Missing
        } else {
            constraint
        };
        Self {
            name: name.into().trim().to_string(),
            version,
            constraint,
        }
    }

    /// Returns the advisory issue this declaration deserves, if any
    pub fn issue(&self) -> Option<Issue> {
        match &self.constraint {
            Constraint::Exact => None,
            Constraint::Weak(comparator) => {
                Some(Issue::weak_version(&self.name, comparator, &self.version))
            }
            Constraint::Missing => Some(Issue::missing_version(&self.name)),
        }
    }

    /// Converts into a dependency record plus its issue
    pub fn into_dependency(self, ecosystem: Ecosystem) -> (Dependency, Option<Issue>) {
        let issue = self.issue();
        (Dependency::new(&self.name, &self.version, ecosystem), issue)
    }
}

/// Trait for parsing a complete `name[comparator]version` declaration
pub trait RequirementParser {
    /// Parse a declaration, returning None when it matches no known pattern
    fn parse(&self, spec: &str) -> Option<Requirement>;

    /// Returns the ecosystem this parser handles
    fn ecosystem(&self) -> Ecosystem;
}

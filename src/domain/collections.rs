//! Ordered dependency and issue collections

use super::{Dependency, Issue};
use serde::Serialize;
use std::collections::HashSet;

/// An ordered sequence of dependencies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Dependencies(Vec<Dependency>);

impl Dependencies {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a dependency
    pub fn push(&mut self, dep: Dependency) {
        self.0.push(dep);
    }

    /// Appends every dependency of another collection
    pub fn append(&mut self, other: Dependencies) {
        self.0.extend(other.0);
    }

    /// Returns the number of dependencies
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no dependencies
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the dependencies in their current order
    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.0.iter()
    }

    /// Returns the dependencies as a slice
    pub fn as_slice(&self) -> &[Dependency] {
        &self.0
    }

    /// Sorts by ecosystem, then name
    pub fn sort(&mut self) {
        self.0.sort();
    }

    /// Removes exact duplicates by full string form
    ///
    /// The first occurrence of each dependency is kept in place; every later
    /// repeat is returned in the second collection.
    pub fn dedup(self) -> (Dependencies, Dependencies) {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(self.0.len());
        let mut duplicates = Vec::new();

        for dep in self.0 {
            if seen.insert(dep.full_string()) {
                unique.push(dep);
            } else {
                duplicates.push(dep);
            }
        }

        (Dependencies(unique), Dependencies(duplicates))
    }

    /// Consumes the collection into a plain vector
    pub fn into_vec(self) -> Vec<Dependency> {
        self.0
    }
}

impl FromIterator<Dependency> for Dependencies {
    fn from_iter<T: IntoIterator<Item = Dependency>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Dependencies {
    type Item = Dependency;
    type IntoIter = std::vec::IntoIter<Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dependencies {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An ordered sequence of issues
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Issues(Vec<Issue>);

impl Issues {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an issue
    pub fn push(&mut self, issue: Issue) {
        self.0.push(issue);
    }

    /// Appends every issue of another collection
    pub fn append(&mut self, other: Issues) {
        self.0.extend(other.0);
    }

    /// Returns the number of issues
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no issues
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the issues in their current order
    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.0.iter()
    }

    /// Sorts lexically
    pub fn sort(&mut self) {
        self.0.sort();
    }

    /// Returns a lexically sorted copy
    pub fn sorted(mut self) -> Self {
        self.sort();
        self
    }
}

impl FromIterator<Issue> for Issues {
    fn from_iter<T: IntoIterator<Item = Issue>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Issues {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Output of one successful resolve call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Resolved dependencies
    pub dependencies: Dependencies,
    /// Advisory issues recorded along the way
    pub issues: Issues,
}

impl Resolution {
    /// Creates a resolution from its parts, putting both in canonical order
    pub fn new(mut dependencies: Dependencies, issues: Issues) -> Self {
        dependencies.sort();
        Self {
            dependencies,
            issues: issues.sorted(),
        }
    }

    /// Merges another resolution into this one, keeping canonical order
    pub fn merge(&mut self, other: Resolution) {
        self.dependencies.append(other.dependencies);
        self.dependencies.sort();
        self.issues.append(other.issues);
        self.issues.sort();
    }
}

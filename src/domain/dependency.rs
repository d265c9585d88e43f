//! Dependency records produced by the resolvers

use super::Ecosystem;
use crate::error::ManifestError;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A resolved third-party dependency
///
/// Name and version are lowercased on construction, so equality is
/// case-insensitive with respect to the original declaration. An empty
/// version means the version is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    /// Package name
    pub name: String,
    /// Version, empty when unknown
    pub version: String,
    /// Ecosystem the dependency belongs to
    pub ecosystem: Ecosystem,
    /// Optional project scope (only set for project-scoped records)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl Dependency {
    /// Creates a new dependency
    pub fn new(name: impl AsRef<str>, version: impl AsRef<str>, ecosystem: Ecosystem) -> Self {
        Self {
            name: name.as_ref().trim().to_lowercase(),
            version: version.as_ref().trim().to_lowercase(),
            ecosystem,
            project: None,
        }
    }

    /// Scopes this dependency to a project (builder pattern)
    pub fn with_project(mut self, project: impl AsRef<str>) -> Self {
        self.project = Some(project.as_ref().trim().to_lowercase());
        self
    }

    /// Returns true if a version was declared or resolved
    pub fn has_version(&self) -> bool {
        !self.version.is_empty()
    }

    /// Compares name and version only
    pub fn simple_eq(&self, other: &Dependency) -> bool {
        self.name == other.name && self.version == other.version
    }

    /// Short form: `name:version`
    pub fn short_string(&self) -> String {
        format!("{}:{}", escape(&self.name), escape(&self.version))
    }

    /// Full form: `name:version:ecosystem` or `name:version:project:ecosystem`
    ///
    /// A `:` or `\` inside a field is written with a leading `\`, so every
    /// value keeps exactly its own segment.
    pub fn full_string(&self) -> String {
        match &self.project {
            Some(project) => format!(
                "{}:{}:{}",
                self.short_string(),
                escape(project),
                self.ecosystem.token()
            ),
            None => format!("{}:{}", self.short_string(), self.ecosystem.token()),
        }
    }

    /// Reconstructs a dependency from any of its string forms
    ///
    /// Accepts 1 to 4 colon-delimited segments:
    /// `name`, `name:version`, `name:version:ecosystem` and
    /// `name:version:project:ecosystem`.
    pub fn from_full_string(s: &str) -> Result<Self, ManifestError> {
        let invalid = |message: String| ManifestError::InvalidDependencyString {
            value: s.to_string(),
            message,
        };
        let segments = split_segments(s).map_err(|e| invalid(e.to_string()))?;

        if segments[0].trim().is_empty() {
            return Err(invalid("missing package name".to_string()));
        }

        match segments.as_slice() {
            [name] => Ok(Dependency::new(name, "", Ecosystem::Unknown)),
            [name, version] => Ok(Dependency::new(name, version, Ecosystem::Unknown)),
            [name, version, ecosystem] => {
                let ecosystem = ecosystem.parse::<Ecosystem>().map_err(invalid)?;
                Ok(Dependency::new(name, version, ecosystem))
            }
            [name, version, project, ecosystem] => {
                let ecosystem = ecosystem.parse::<Ecosystem>().map_err(invalid)?;
                Ok(Dependency::new(name, version, ecosystem).with_project(project))
            }
            _ => Err(invalid(format!(
                "expected 1 to 4 segments, found {}",
                segments.len()
            ))),
        }
    }
}

fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        if c == ':' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Split on unescaped `:` and unescape each segment
fn split_segments(s: &str) -> Result<Vec<String>, &'static str> {
    let mut segments = vec![String::new()];
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().ok_or("dangling escape at end of string")?;
                if let Some(current) = segments.last_mut() {
                    current.push(escaped);
                }
            }
            ':' => segments.push(String::new()),
            other => {
                if let Some(current) = segments.last_mut() {
                    current.push(other);
                }
            }
        }
    }
    Ok(segments)
}

impl Ord for Dependency {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ecosystem
            .cmp(&other.ecosystem)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.version.cmp(&other.version))
            .then_with(|| self.project.cmp(&other.project))
    }
}

impl PartialOrd for Dependency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_string())
    }
}

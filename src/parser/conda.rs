//! Conda package spec parser
//!
//! Handles spec formats:
//! - Exact: `numpy=1.14.0`, `numpy==1.14.0`
//! - With build string: `numpy=1.14.0=py27_0`, `numpy 1.14.0 py27_0`
//! - Bounded: `numpy>=1.14`, `numpy<=1.14`, `numpy>1.14` (flagged as weak)
//! - Bare: `numpy` (flagged as missing a version)
//! - Channel-qualified: `conda-forge::numpy=1.14.0`
//!
//! Multi-token versions are joined with `=` and kept as one field.

use crate::domain::Ecosystem;
use crate::parser::{Constraint, Requirement, RequirementParser};
use regex::Regex;
use std::sync::LazyLock;

/// Conda package spec parser
pub struct CondaSpecParser;

static SPEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_][A-Za-z0-9._-]*)\s*(<=|>=|==|!=|~=|=|<|>)?\s*(.*)$").unwrap()
});

impl RequirementParser for CondaSpecParser {
    fn parse(&self, spec: &str) -> Option<Requirement> {
        let trimmed = spec.trim();
        // Channel prefix (`channel::name`) is not part of the package name
        let unqualified = match trimmed.rfind("::") {
            Some(idx) => &trimmed[idx + 2..],
            None => trimmed,
        };

        let caps = SPEC_RE.captures(unqualified)?;
        let name = caps.get(1)?.as_str();
        let comparator = caps.get(2).map(|m| m.as_str());
        let version = join_version_tokens(caps.get(3).map(|m| m.as_str()).unwrap_or(""));

        let constraint = match comparator {
            None | Some("=") | Some("==") => Constraint::Exact,
            Some(other) => Constraint::Weak(other.to_string()),
        };

        Some(Requirement::new(name, version, constraint))
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Conda
    }
}

/// Join whitespace- or `=`-separated version tokens with `=`
fn join_version_tokens(rest: &str) -> String {
    rest.split(|c: char| c.is_whitespace() || c == '=')
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("=")
}

/// Split a recipe requirement entry into whitespace-separated tokens
///
/// A `{{ ... }}` template placeholder is kept together as one token and
/// passed through verbatim.
pub fn split_recipe_entry(entry: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = entry.trim().chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                depth += 1;
                current.push_str("{{");
            }
            '}' if depth > 0 && chars.peek() == Some(&'}') => {
                chars.next();
                depth -= 1;
                current.push_str("}}");
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

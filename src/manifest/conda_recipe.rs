//! Conda recipe (meta.yaml) resolver
//!
//! Reads `requirements.build`, `requirements.host` and `requirements.run`,
//! plus `test.requires` when test dependencies are requested. Entries are
//! `name [version] [build-string]`; everything after the name is kept as the
//! version, joined with `=`.
//!
//! Template expressions are not evaluated. Statement lines (`{% ... %}`) are
//! dropped and `{{ ... }}` placeholders pass through as literal text.

use crate::domain::{Dependencies, Dependency, Ecosystem, Issue, Issues, Resolution};
use crate::error::ResolveError;
use crate::manifest::{parse_yaml, ManifestResolver, ResolveResult, ResolverContext};
use crate::parser::split_recipe_entry;
use regex::Regex;
use serde_yaml::Value;
use std::path::Path;
use std::sync::LazyLock;

/// Resolver for meta.yaml recipes
pub struct CondaRecipeResolver;

const REQUIREMENT_SECTIONS: &[&str] = &["build", "host", "run"];

static STATEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\{%.*%\}\s*$").unwrap());

// A scalar that starts with a placeholder would otherwise read as a flow mapping
static PLACEHOLDER_SCALAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*(?:-\s+|[A-Za-z0-9_.-]+:\s+))(\{\{.*?)(\s+#.*)?$").unwrap());

impl ManifestResolver for CondaRecipeResolver {
    fn resolve(&self, ctx: &ResolverContext, path: &Path, include_test: bool) -> ResolveResult {
        let content = ctx
            .read_text(path)
            .map_err(|e| ResolveError::new(e, Issues::new()))?;
        let document: Value = parse_yaml(&strip_templating(&content), path)?;

        let mut entries: Vec<&str> = Vec::new();
        if let Some(requirements) = document.get("requirements") {
            for section in REQUIREMENT_SECTIONS {
                entries.extend(string_list(requirements.get(*section)));
            }
        }
        if include_test {
            entries.extend(string_list(
                document.get("test").and_then(|t| t.get("requires")),
            ));
        }

        let mut dependencies = Dependencies::new();
        let mut issues = Issues::new();

        for entry in entries {
            let tokens = split_recipe_entry(entry);
            let Some((name, rest)) = tokens.split_first() else {
                continue;
            };
            if rest.is_empty() {
                issues.push(Issue::missing_version(name));
            }
            dependencies.push(Dependency::new(name, rest.join("="), Ecosystem::Conda));
        }

        Ok(Resolution::new(dependencies, issues))
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Conda
    }
}

fn string_list(value: Option<&Value>) -> impl Iterator<Item = &str> {
    value
        .and_then(Value::as_sequence)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

/// Make a templated recipe loadable as plain YAML
fn strip_templating(content: &str) -> String {
    content
        .lines()
        .filter(|line| !STATEMENT_RE.is_match(line))
        .map(|line| match PLACEHOLDER_SCALAR_RE.captures(line) {
            Some(caps) => {
                let scalar = caps[2].trim_end().replace('\'', "''");
                format!("{}'{}'", &caps[1], scalar)
            }
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

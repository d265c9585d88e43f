//! Conda environment file resolver
//!
//! Handles `dependencies` lists mixing:
//! - bare Conda package specs (`numpy=1.14.0`, `scipy>=1.0`)
//! - a nested `pip:` list of pip requirement lines, tagged as Python

use crate::domain::{Dependencies, Ecosystem, Issues, Resolution};
use crate::error::{ManifestError, ResolveError};
use crate::manifest::requirements::resolve_pip_lines;
use crate::manifest::{parse_yaml, ManifestResolver, ResolveResult, ResolverContext};
use crate::parser::{CondaSpecParser, RequirementParser};
use serde_yaml::Value;
use std::path::Path;

/// Resolver for environment.yml files
pub struct CondaEnvironmentResolver;

impl ManifestResolver for CondaEnvironmentResolver {
    fn resolve(&self, ctx: &ResolverContext, path: &Path, _include_test: bool) -> ResolveResult {
        let content = ctx
            .read_text(path)
            .map_err(|e| ResolveError::new(e, Issues::new()))?;
        let document: Value = parse_yaml(&content, path)?;

        let mut dependencies = Dependencies::new();
        let mut issues = Issues::new();

        let entries = document
            .get("dependencies")
            .and_then(Value::as_sequence)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for entry in entries {
            let result = match entry {
                Value::String(spec) => {
                    resolve_conda_spec(spec, path, &mut dependencies, &mut issues)
                }
                Value::Mapping(_) => match entry.get("pip").and_then(Value::as_sequence) {
                    Some(pip) => resolve_pip_lines(
                        pip.iter().filter_map(Value::as_str),
                        path,
                        &mut dependencies,
                        &mut issues,
                    ),
                    None => {
                        tracing::debug!(path = %path.display(), "skipping non-pip mapping entry");
                        Ok(())
                    }
                },
                _ => {
                    tracing::debug!(path = %path.display(), ?entry, "skipping non-string entry");
                    Ok(())
                }
            };
            result.map_err(|e| ResolveError::new(e, issues.clone().sorted()))?;
        }

        Ok(Resolution::new(dependencies, issues))
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Conda
    }
}

fn resolve_conda_spec(
    spec: &str,
    path: &Path,
    dependencies: &mut Dependencies,
    issues: &mut Issues,
) -> Result<(), ManifestError> {
    let requirement = CondaSpecParser
        .parse(spec)
        .ok_or_else(|| ManifestError::unmatched_line(path, spec.trim()))?;
    let (dep, issue) = requirement.into_dependency(Ecosystem::Conda);
    dependencies.push(dep);
    if let Some(issue) = issue {
        issues.push(issue);
    }
    Ok(())
}

//! package.json resolver for npm projects
//!
//! Handles:
//! - dependencies
//! - devDependencies (only when test dependencies are requested; entries
//!   override same-named production entries)
//!
//! `npm:` aliases are classified by the aliased spec. Local paths and
//! tarball URLs carry no registry version.

use crate::domain::{Dependencies, Ecosystem, Issues, Resolution};
use crate::error::{ManifestError, ResolveError};
use crate::manifest::{ManifestResolver, ResolveResult, ResolverContext};
use crate::parser::{parse_version_spec, Requirement};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Resolver for package.json files
pub struct PackageJsonResolver;

impl ManifestResolver for PackageJsonResolver {
    fn resolve(&self, ctx: &ResolverContext, path: &Path, include_test: bool) -> ResolveResult {
        let content = ctx
            .read_text(path)
            .map_err(|e| ResolveError::new(e, Issues::new()))?;

        let json: Value = serde_json::from_str(&content).map_err(|e| {
            ResolveError::new(ManifestError::json_parse_error(path, e.to_string()), Issues::new())
        })?;

        let mut specs = BTreeMap::new();
        if let Some(deps) = json.get("dependencies").and_then(|v| v.as_object()) {
            collect_specs(deps, &mut specs);
        }
        if include_test {
            if let Some(deps) = json.get("devDependencies").and_then(|v| v.as_object()) {
                collect_specs(deps, &mut specs);
            }
        }

        let mut dependencies = Dependencies::new();
        let mut issues = Issues::new();

        for (name, spec) in specs {
            let (version, constraint) = parse_version_spec(&spec);
            let (dep, issue) =
                Requirement::new(name, version, constraint).into_dependency(Ecosystem::Npm);
            dependencies.push(dep);
            if let Some(issue) = issue {
                issues.push(issue);
            }
        }

        Ok(Resolution::new(dependencies, issues))
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }
}

fn collect_specs(deps: &Map<String, Value>, output: &mut BTreeMap<String, String>) {
    for (name, value) in deps {
        match value.as_str() {
            Some(spec) => {
                output.insert(name.clone(), spec.to_string());
            }
            None => tracing::debug!(package = %name, "skipping non-string version spec"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_tool::StaticBuildTool;
    use crate::domain::{Dependency, Issue};
    use crate::error::ResolveFailure;
    use crate::reader::MemoryReader;
    use std::sync::Arc;

    fn resolve(content: &str, include_test: bool) -> ResolveResult {
        let reader = MemoryReader::new().with_file("package.json", content);
        let ctx = ResolverContext::new(Arc::new(reader), Arc::new(StaticBuildTool::new()));
        PackageJsonResolver.resolve(&ctx, Path::new("package.json"), include_test)
    }

    fn full_strings(resolution: &Resolution) -> Vec<String> {
        resolution
            .dependencies
            .iter()
            .map(|d| d.full_string())
            .collect()
    }

    #[test]
    fn test_resolve_simple_dependencies() {
        let content = r#"{
            "dependencies": {
                "lodash": "4.17.21",
                "express": "4.18.2"
            }
        }"#;

        let resolution = resolve(content, false).unwrap();
        assert_eq!(
            full_strings(&resolution),
            vec!["express:4.18.2:npm", "lodash:4.17.21:npm"]
        );
        assert!(resolution.issues.is_empty());
    }

    #[test]
    fn test_resolve_weak_versions_flagged() {
        let content = r#"{
            "dependencies": {
                "lodash": "^4.17.21",
                "express": "~4.18.2"
            }
        }"#;

        let resolution = resolve(content, false).unwrap();
        assert_eq!(
            full_strings(&resolution),
            vec!["express:4.18.2:npm", "lodash:4.17.21:npm"]
        );
        assert_eq!(resolution.issues.len(), 2);
        assert!(resolution.issues.iter().any(|i| i.as_str().contains("'^4.17.21'")));
    }

    #[test]
    fn test_dev_dependencies_excluded_by_default() {
        let content = r#"{
            "dependencies": { "react": "18.2.0" },
            "devDependencies": { "typescript": "5.0.0" }
        }"#;

        let resolution = resolve(content, false).unwrap();
        assert_eq!(full_strings(&resolution), vec!["react:18.2.0:npm"]);
    }

    #[test]
    fn test_dev_dependencies_win_on_collision() {
        let content = r#"{
            "dependencies": { "react": "18.2.0" },
            "devDependencies": { "react": "18.3.1", "jest": "29.0.0" }
        }"#;

        let resolution = resolve(content, true).unwrap();
        assert_eq!(
            full_strings(&resolution),
            vec!["jest:29.0.0:npm", "react:18.3.1:npm"]
        );
    }

    #[test]
    fn test_vcs_spec_uses_reference() {
        let content = r#"{
            "dependencies": { "widget": "git+https://github.com/org/widget.git#v2.0.1" }
        }"#;

        let resolution = resolve(content, false).unwrap();
        assert_eq!(full_strings(&resolution), vec!["widget:v2.0.1:npm"]);
        assert!(resolution.issues.is_empty());
    }

    #[test]
    fn test_alias_and_non_registry_specs_round_trip() {
        let content = r#"{
            "dependencies": {
                "x": "https://example.com/x-1.0.tgz",
                "y": "npm:lodash@4.17.21",
                "z": "file:../z"
            }
        }"#;

        let resolution = resolve(content, false).unwrap();
        assert_eq!(
            full_strings(&resolution),
            vec!["x::npm", "y:4.17.21:npm", "z::npm"]
        );
        for dep in resolution.dependencies.iter() {
            let back = Dependency::from_full_string(&dep.full_string()).unwrap();
            assert_eq!(&back, dep);
        }
        assert_eq!(
            resolution.issues.iter().collect::<Vec<_>>(),
            vec![&Issue::missing_version("x"), &Issue::missing_version("z")]
        );
    }

    #[test]
    fn test_empty_object() {
        let resolution = resolve("{}", true).unwrap();
        assert!(resolution.dependencies.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let err = resolve("not json", false).unwrap_err();
        assert!(matches!(
            err.failure,
            ResolveFailure::Manifest(ManifestError::JsonParseError { .. })
        ));
    }

    #[test]
    fn test_ecosystem() {
        assert_eq!(PackageJsonResolver.ecosystem(), Ecosystem::Npm);
    }
}

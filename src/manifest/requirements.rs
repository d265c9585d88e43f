//! requirements.txt resolver for pip projects
//!
//! Handles:
//! - pinned (`==`) and bounded (`>=`, `<=`) declarations
//! - VCS URLs (name taken from the repository path)
//! - comments, include directives and local paths (skipped)
//! - `\`-continued lines, such as hashed pip-compile output

use crate::domain::{Dependencies, Ecosystem, Issues, Resolution};
use crate::error::{ManifestError, ResolveError};
use crate::manifest::{ManifestResolver, ResolveResult, ResolverContext};
use crate::parser::{parse_pip_line, PipLine};
use std::path::Path;

/// Resolver for requirements.txt files
pub struct RequirementsResolver;

impl ManifestResolver for RequirementsResolver {
    fn resolve(&self, ctx: &ResolverContext, path: &Path, _include_test: bool) -> ResolveResult {
        let content = ctx
            .read_text(path)
            .map_err(|e| ResolveError::new(e, Issues::new()))?;

        let mut dependencies = Dependencies::new();
        let mut issues = Issues::new();
        resolve_pip_lines(content.lines(), path, &mut dependencies, &mut issues)
            .map_err(|e| ResolveError::new(e, issues.clone().sorted()))?;

        Ok(Resolution::new(dependencies, issues))
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Python
    }
}

/// Resolve pip-style lines, tagging every accepted declaration as Python
///
/// Shared with the `pip:` section of Conda environment files.
pub(crate) fn resolve_pip_lines<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    path: &Path,
    dependencies: &mut Dependencies,
    issues: &mut Issues,
) -> Result<(), ManifestError> {
    for line in join_continuations(lines) {
        match parse_pip_line(&line) {
            PipLine::Skip => {}
            PipLine::Requirement(req) => {
                let (dep, issue) = req.into_dependency(Ecosystem::Python);
                dependencies.push(dep);
                if let Some(issue) = issue {
                    issues.push(issue);
                }
            }
            PipLine::Unmatched => {
                return Err(ManifestError::unmatched_line(path, line.trim()));
            }
        }
    }
    Ok(())
}

/// Join lines ending in `\` with the line that follows
///
/// Comment lines are never continued.
fn join_continuations<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut logical = Vec::new();
    let mut pending = String::new();

    for line in lines {
        let trimmed = line.trim_end();
        if pending.is_empty() && trimmed.trim_start().starts_with('#') {
            logical.push(trimmed.to_string());
            continue;
        }
        match trimmed.strip_suffix('\\') {
            Some(head) => {
                pending.push_str(head);
                pending.push(' ');
            }
            None => {
                pending.push_str(trimmed);
                logical.push(std::mem::take(&mut pending));
            }
        }
    }
    if !pending.trim().is_empty() {
        logical.push(pending);
    }
    logical
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_tool::StaticBuildTool;
    use crate::domain::Issue;
    use crate::error::ResolveFailure;
    use crate::reader::MemoryReader;
    use std::sync::Arc;

    fn resolve(content: &str) -> ResolveResult {
        let reader = MemoryReader::new().with_file("requirements.txt", content);
        let ctx = ResolverContext::new(Arc::new(reader), Arc::new(StaticBuildTool::new()));
        RequirementsResolver.resolve(&ctx, Path::new("requirements.txt"), false)
    }

    #[test]
    fn test_resolve_pinned_file() {
        let content = "# pinned\nFlask==1.0.2\n\n-r base.txt\nrequests==2.19.1\n";
        let resolution = resolve(content).unwrap();
        let full: Vec<String> = resolution
            .dependencies
            .iter()
            .map(|d| d.full_string())
            .collect();
        assert_eq!(full, vec!["flask:1.0.2:python", "requests:2.19.1:python"]);
        assert!(resolution.issues.is_empty());
    }

    #[test]
    fn test_resolve_weak_version() {
        let resolution = resolve("kcilc>=0.6\n").unwrap();
        let dep = &resolution.dependencies.as_slice()[0];
        assert_eq!(dep.name, "kcilc");
        assert_eq!(dep.version, "0.6");
        assert_eq!(resolution.issues.len(), 1);
        let issue = resolution.issues.iter().next().unwrap();
        assert!(issue.as_str().contains(">="));
        assert!(issue.as_str().contains("0.6"));
    }

    #[test]
    fn test_resolve_vcs_line() {
        let resolution =
            resolve("git+https://github.com/happy/place.git@v0.1.8#egg=some-thing\n").unwrap();
        let dep = &resolution.dependencies.as_slice()[0];
        assert_eq!(dep.name, "place");
        assert_eq!(dep.version, "v0.1.8");
        assert_eq!(dep.ecosystem, Ecosystem::Python);
    }

    #[test]
    fn test_resolve_missing_version_issue() {
        let resolution = resolve("numpy\n").unwrap();
        assert_eq!(
            resolution.issues.iter().next(),
            Some(&Issue::missing_version("numpy"))
        );
    }

    #[test]
    fn test_resolve_unmatched_line_is_error_with_issues() {
        let err = resolve("kcilc>=0.6\nfoo~=1.0\n").unwrap_err();
        assert!(matches!(
            err.failure,
            ResolveFailure::Manifest(ManifestError::UnmatchedLine { .. })
        ));
        assert_eq!(err.issues.len(), 1);
    }

    #[test]
    fn test_resolve_hashed_continuations() {
        let content = "flask==1.0.2 \\\n    --hash=sha256:abcdef \\\n    --hash=sha256:012345\nsix==1.11.0 \\\n    --hash=sha256:fedcba\n";
        let resolution = resolve(content).unwrap();
        let full: Vec<String> = resolution
            .dependencies
            .iter()
            .map(|d| d.full_string())
            .collect();
        assert_eq!(full, vec!["flask:1.0.2:python", "six:1.11.0:python"]);
        assert!(resolution.issues.is_empty());
    }

    #[test]
    fn test_join_continuations() {
        let joined = join_continuations(["a==1 \\", "  --hash=x", "# note \\", "b==2"]);
        assert_eq!(joined.len(), 3);
        assert!(joined[0].starts_with("a==1"));
        assert!(joined[0].contains("--hash=x"));
        assert_eq!(joined[1], "# note \\");
        assert_eq!(joined[2], "b==2");
    }

    #[test]
    fn test_resolve_missing_file() {
        let reader = MemoryReader::new();
        let ctx = ResolverContext::new(Arc::new(reader), Arc::new(StaticBuildTool::new()));
        let err = RequirementsResolver
            .resolve(&ctx, Path::new("requirements.txt"), false)
            .unwrap_err();
        assert!(matches!(
            err.failure,
            ResolveFailure::Manifest(ManifestError::ReadError { .. })
        ));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let content = "b==1.0\na>=2.0\nc\n";
        assert_eq!(resolve(content).unwrap(), resolve(content).unwrap());
    }
}

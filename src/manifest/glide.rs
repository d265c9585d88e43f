//! glide.yaml resolver for vendored Go projects
//!
//! The manifest is read together with its lock file (`glide.lock`, same
//! basename). Versions stated in the manifest are kept as written; the lock
//! is only consulted to backfill entries that state no version.

use crate::domain::{Dependencies, Dependency, Ecosystem, Issue, Issues, Resolution};
use crate::error::{ManifestError, ResolveError};
use crate::manifest::{parse_yaml, ManifestResolver, ResolveResult, ResolverContext};
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// Resolver for glide.yaml + glide.lock pairs
pub struct GlideResolver;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlideManifest {
    #[serde(default)]
    import: Vec<GlideImport>,
    #[serde(default)]
    test_import: Vec<GlideImport>,
}

#[derive(Debug, Deserialize)]
struct GlideImport {
    package: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlideLock {
    #[serde(default)]
    imports: Vec<LockedImport>,
    #[serde(default)]
    test_imports: Vec<LockedImport>,
}

#[derive(Debug, Deserialize)]
struct LockedImport {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

impl GlideLock {
    fn revisions(&self) -> HashMap<&str, &str> {
        self.imports
            .iter()
            .chain(self.test_imports.iter())
            .filter_map(|entry| {
                let version = entry.version.as_deref()?.trim();
                (!version.is_empty()).then_some((entry.name.trim(), version))
            })
            .collect()
    }
}

impl ManifestResolver for GlideResolver {
    fn resolve(&self, ctx: &ResolverContext, path: &Path, include_test: bool) -> ResolveResult {
        let content = ctx
            .read_text(path)
            .map_err(|e| ResolveError::new(e, Issues::new()))?;
        let manifest: GlideManifest = parse_yaml(&content, path)?;

        let lock_path = path.with_extension("lock");
        let lock = read_lock(ctx, &lock_path)?;
        let revisions = lock.revisions();

        let mut imports: Vec<&GlideImport> = manifest.import.iter().collect();
        if include_test {
            imports.extend(manifest.test_import.iter());
        }

        let mut dependencies = Dependencies::new();
        let mut issues = Issues::new();

        for import in imports {
            let name = import.package.trim();
            if name.is_empty() {
                continue;
            }

            let declared = import.version.as_deref().map(str::trim).unwrap_or("");
            let version = if !declared.is_empty() {
                declared
            } else {
                issues.push(Issue::missing_version(name));
                match revisions.get(name) {
                    Some(revision) => *revision,
                    None => {
                        issues.push(Issue::unresolved_revision(name));
                        ""
                    }
                }
            };

            dependencies.push(Dependency::new(name, version, Ecosystem::Go));
        }

        Ok(Resolution::new(dependencies, issues))
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }
}

fn read_lock(ctx: &ResolverContext, lock_path: &Path) -> Result<GlideLock, ResolveError> {
    match ctx.reader().read(lock_path) {
        Ok(bytes) => {
            let content = String::from_utf8(bytes).map_err(|_| {
                ResolveError::new(
                    ManifestError::Encoding {
                        path: lock_path.to_path_buf(),
                    },
                    Issues::new(),
                )
            })?;
            parse_yaml(&content, lock_path)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %lock_path.display(), "no lock file");
            Ok(GlideLock::default())
        }
        Err(e) => Err(ResolveError::new(
            ManifestError::read_error(lock_path, e),
            Issues::new(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_tool::StaticBuildTool;
    use crate::error::ResolveFailure;
    use crate::reader::MemoryReader;
    use std::sync::Arc;

    const MANIFEST: &str = r#"
package: github.com/acme/service
import:
- package: github.com/pkg/errors
  version: v0.8.0
- package: github.com/sirupsen/logrus
- package: github.com/unlocked/thing
testImport:
- package: github.com/stretchr/testify
"#;

    const LOCK: &str = r#"
hash: 1c8d4b1ed0e4a1d5
updated: 2018-03-01T10:00:00Z
imports:
- name: github.com/pkg/errors
  version: 645ef00459ed84a119197bfb8d8205042c6df63d
- name: github.com/sirupsen/logrus
  version: d682213848ed68c0a260ca37d6dd5ace8423f5ba
testImports:
- name: github.com/stretchr/testify
  version: 12b6f73e6084dad08a7c6e575284b177ecafbc71
"#;

    fn context(reader: MemoryReader) -> ResolverContext {
        ResolverContext::new(Arc::new(reader), Arc::new(StaticBuildTool::new()))
    }

    fn full_strings(resolution: &Resolution) -> Vec<String> {
        resolution
            .dependencies
            .iter()
            .map(|d| d.full_string())
            .collect()
    }

    #[test]
    fn test_manifest_version_kept_over_lock() {
        let reader = MemoryReader::new()
            .with_file("glide.yaml", MANIFEST)
            .with_file("glide.lock", LOCK);
        let resolution = GlideResolver
            .resolve(&context(reader), Path::new("glide.yaml"), false)
            .unwrap();

        assert_eq!(
            full_strings(&resolution),
            vec![
                "github.com/pkg/errors:v0.8.0:go",
                "github.com/sirupsen/logrus:d682213848ed68c0a260ca37d6dd5ace8423f5ba:go",
                "github.com/unlocked/thing::go",
            ]
        );
    }

    #[test]
    fn test_missing_versions_backfilled_and_flagged() {
        let reader = MemoryReader::new()
            .with_file("glide.yaml", MANIFEST)
            .with_file("glide.lock", LOCK);
        let resolution = GlideResolver
            .resolve(&context(reader), Path::new("glide.yaml"), false)
            .unwrap();

        let issues: Vec<&Issue> = resolution.issues.iter().collect();
        assert!(issues.contains(&&Issue::missing_version("github.com/sirupsen/logrus")));
        assert!(issues.contains(&&Issue::missing_version("github.com/unlocked/thing")));
        assert!(issues.contains(&&Issue::unresolved_revision("github.com/unlocked/thing")));
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_test_imports_included_on_request() {
        let reader = MemoryReader::new()
            .with_file("glide.yaml", MANIFEST)
            .with_file("glide.lock", LOCK);
        let resolution = GlideResolver
            .resolve(&context(reader), Path::new("glide.yaml"), true)
            .unwrap();

        assert!(full_strings(&resolution).contains(
            &"github.com/stretchr/testify:12b6f73e6084dad08a7c6e575284b177ecafbc71:go".to_string()
        ));
    }

    #[test]
    fn test_lock_file_optional() {
        let reader = MemoryReader::new().with_file(
            "glide.yaml",
            "import:\n- package: github.com/pkg/errors\n  version: v0.8.0\n",
        );
        let resolution = GlideResolver
            .resolve(&context(reader), Path::new("glide.yaml"), false)
            .unwrap();
        assert_eq!(full_strings(&resolution), vec!["github.com/pkg/errors:v0.8.0:go"]);
        assert!(resolution.issues.is_empty());
    }

    #[test]
    fn test_lock_path_shares_directory() {
        let reader = MemoryReader::new()
            .with_file("vendor/app/glide.yaml", "import:\n- package: golang.org/x/net\n")
            .with_file(
                "vendor/app/glide.lock",
                "imports:\n- name: golang.org/x/net\n  version: abc123\n",
            );
        let resolution = GlideResolver
            .resolve(&context(reader), Path::new("vendor/app/glide.yaml"), false)
            .unwrap();
        assert_eq!(full_strings(&resolution), vec!["golang.org/x/net:abc123:go"]);
    }

    #[test]
    fn test_invalid_yaml() {
        let reader = MemoryReader::new().with_file("glide.yaml", "import: [unclosed");
        let err = GlideResolver
            .resolve(&context(reader), Path::new("glide.yaml"), false)
            .unwrap_err();
        assert!(matches!(
            err.failure,
            ResolveFailure::Manifest(ManifestError::YamlParseError { .. })
        ));
    }
}

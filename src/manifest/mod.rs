//! Manifest dispatch and per-format resolvers
//!
//! This module provides functionality to:
//! - Recognize manifest files by basename
//! - Hold the injected file reader and build tool shared by all resolvers
//! - Resolve a manifest into dependencies and advisory issues

mod conda_env;
mod conda_recipe;
mod glide;
mod package_json;
mod requirements;

pub use conda_env::CondaEnvironmentResolver;
pub use conda_recipe::CondaRecipeResolver;
pub use glide::GlideResolver;
pub use package_json::PackageJsonResolver;
pub use requirements::RequirementsResolver;

use crate::build_tool::{BuildTool, MavenCli, ToolLock};
use crate::domain::{Ecosystem, Issues, Resolution};
use crate::error::{ManifestError, ResolveError};
use crate::maven::MavenResolver;
use crate::reader::{FileReader, FsReader};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Outcome of a single resolve call
pub type ResolveResult = Result<Resolution, ResolveError>;

/// Recognized manifest formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    /// Maven project descriptor
    PomXml,
    /// npm manifest
    PackageJson,
    /// glide manifest, read together with glide.lock
    GlideYaml,
    /// pip pinned-requirements file
    Requirements,
    /// Conda environment file
    CondaEnvironment,
    /// Conda recipe
    CondaRecipe,
}

impl ManifestKind {
    /// Returns the canonical basenames for this kind
    pub fn basenames(&self) -> &'static [&'static str] {
        match self {
            ManifestKind::PomXml => &["pom.xml"],
            ManifestKind::PackageJson => &["package.json"],
            ManifestKind::GlideYaml => &["glide.yaml"],
            ManifestKind::Requirements => &["requirements.txt", "requirements-dev.txt"],
            ManifestKind::CondaEnvironment => &["environment.yml", "environment-dev.yml"],
            ManifestKind::CondaRecipe => &["meta.yaml"],
        }
    }

    /// Returns the ecosystem dependencies of this kind are tagged with
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            ManifestKind::PomXml => Ecosystem::Maven,
            ManifestKind::PackageJson => Ecosystem::Npm,
            ManifestKind::GlideYaml => Ecosystem::Go,
            ManifestKind::Requirements => Ecosystem::Python,
            ManifestKind::CondaEnvironment | ManifestKind::CondaRecipe => Ecosystem::Conda,
        }
    }

    /// Returns all manifest kinds
    pub fn all() -> &'static [ManifestKind] {
        &[
            ManifestKind::PomXml,
            ManifestKind::PackageJson,
            ManifestKind::GlideYaml,
            ManifestKind::Requirements,
            ManifestKind::CondaEnvironment,
            ManifestKind::CondaRecipe,
        ]
    }

    /// Recognize a manifest by the basename of `path`
    pub fn from_path(path: &Path) -> Option<ManifestKind> {
        let basename = path.file_name()?.to_str()?;
        ManifestKind::all()
            .iter()
            .copied()
            .find(|kind| kind.basenames().contains(&basename))
    }
}

/// Capabilities shared by every resolver
///
/// The reader and build tool are caller-provided and may be long-lived;
/// nothing else survives between resolve calls.
#[derive(Clone)]
pub struct ResolverContext {
    reader: Arc<dyn FileReader>,
    build_tool: Arc<dyn BuildTool>,
    tool_lock: Arc<ToolLock>,
}

impl ResolverContext {
    /// Create a context from a reader and a build tool
    pub fn new(reader: Arc<dyn FileReader>, build_tool: Arc<dyn BuildTool>) -> Self {
        Self {
            reader,
            build_tool,
            tool_lock: Arc::new(ToolLock::default()),
        }
    }

    /// Context backed by the real filesystem and `mvn` from PATH
    pub fn system() -> Self {
        Self::new(Arc::new(FsReader), Arc::new(MavenCli::new()))
    }

    /// Share a tool lock across contexts (builder pattern)
    pub fn with_tool_lock(mut self, lock: Arc<ToolLock>) -> Self {
        self.tool_lock = lock;
        self
    }

    /// Returns the file reader
    pub fn reader(&self) -> &dyn FileReader {
        self.reader.as_ref()
    }

    /// Returns the build tool
    pub fn build_tool(&self) -> &dyn BuildTool {
        self.build_tool.as_ref()
    }

    /// Returns the build tool lock
    pub fn tool_lock(&self) -> &ToolLock {
        self.tool_lock.as_ref()
    }

    /// Read `path` through the injected reader as UTF-8 text
    pub fn read_text(&self, path: &Path) -> Result<String, ManifestError> {
        let bytes = self
            .reader
            .read(path)
            .map_err(|e| ManifestError::read_error(path, e))?;
        String::from_utf8(bytes).map_err(|_| ManifestError::Encoding {
            path: path.to_path_buf(),
        })
    }
}

/// Trait for resolving one manifest format
pub trait ManifestResolver {
    /// Resolve the manifest at `path`
    fn resolve(&self, ctx: &ResolverContext, path: &Path, include_test: bool) -> ResolveResult;

    /// Returns the ecosystem this resolver produces
    fn ecosystem(&self) -> Ecosystem;
}

/// Get the resolver for a manifest kind
pub fn get_resolver(kind: ManifestKind) -> Box<dyn ManifestResolver> {
    match kind {
        ManifestKind::PomXml => Box::new(MavenResolver),
        ManifestKind::PackageJson => Box::new(PackageJsonResolver),
        ManifestKind::GlideYaml => Box::new(GlideResolver),
        ManifestKind::Requirements => Box::new(RequirementsResolver),
        ManifestKind::CondaEnvironment => Box::new(CondaEnvironmentResolver),
        ManifestKind::CondaRecipe => Box::new(CondaRecipeResolver),
    }
}

/// Decode a YAML document, treating an empty document as the default value
pub(crate) fn parse_yaml<T>(content: &str, path: &Path) -> Result<T, ResolveError>
where
    T: DeserializeOwned + Default,
{
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(content).map_err(|e| {
        ResolveError::new(ManifestError::yaml_parse_error(path, e.to_string()), Issues::new())
    })
}

/// Resolve a manifest, dispatching on its basename
pub fn resolve_manifest(ctx: &ResolverContext, path: &Path, include_test: bool) -> ResolveResult {
    let kind = ManifestKind::from_path(path).ok_or_else(|| {
        ResolveError::new(
            ManifestError::UnsupportedFormat {
                path: path.to_path_buf(),
            },
            Issues::new(),
        )
    })?;

    tracing::debug!(path = %path.display(), ?kind, "resolving manifest");
    get_resolver(kind).resolve(ctx, path, include_test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_tool::StaticBuildTool;
    use crate::error::ResolveFailure;
    use crate::reader::MemoryReader;

    fn context(reader: MemoryReader) -> ResolverContext {
        ResolverContext::new(Arc::new(reader), Arc::new(StaticBuildTool::new()))
    }

    #[test]
    fn test_from_path_recognizes_basenames() {
        let cases = [
            ("repo/pom.xml", ManifestKind::PomXml),
            ("repo/web/package.json", ManifestKind::PackageJson),
            ("glide.yaml", ManifestKind::GlideYaml),
            ("requirements.txt", ManifestKind::Requirements),
            ("requirements-dev.txt", ManifestKind::Requirements),
            ("environment.yml", ManifestKind::CondaEnvironment),
            ("environment-dev.yml", ManifestKind::CondaEnvironment),
            ("recipe/meta.yaml", ManifestKind::CondaRecipe),
        ];
        for (path, kind) in cases {
            assert_eq!(ManifestKind::from_path(Path::new(path)), Some(kind), "{}", path);
        }
    }

    #[test]
    fn test_from_path_unknown() {
        assert_eq!(ManifestKind::from_path(Path::new("Cargo.toml")), None);
        assert_eq!(ManifestKind::from_path(Path::new("glide.lock")), None);
    }

    #[test]
    fn test_ecosystem_mapping() {
        assert_eq!(ManifestKind::PomXml.ecosystem(), Ecosystem::Maven);
        assert_eq!(ManifestKind::PackageJson.ecosystem(), Ecosystem::Npm);
        assert_eq!(ManifestKind::GlideYaml.ecosystem(), Ecosystem::Go);
        assert_eq!(ManifestKind::Requirements.ecosystem(), Ecosystem::Python);
        assert_eq!(ManifestKind::CondaRecipe.ecosystem(), Ecosystem::Conda);
    }

    #[test]
    fn test_get_resolver_matches_kind_ecosystem() {
        for kind in ManifestKind::all() {
            assert_eq!(get_resolver(*kind).ecosystem(), kind.ecosystem());
        }
    }

    #[test]
    fn test_resolve_manifest_rejects_unknown_basename() {
        let ctx = context(MemoryReader::new());
        let err = resolve_manifest(&ctx, Path::new("Gemfile"), false).unwrap_err();
        assert!(matches!(
            err.failure,
            ResolveFailure::Manifest(ManifestError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_resolve_manifest_dispatches() {
        let ctx = context(MemoryReader::new().with_file("requirements.txt", "six==1.11.0\n"));
        let resolution = resolve_manifest(&ctx, Path::new("requirements.txt"), false).unwrap();
        assert_eq!(resolution.dependencies.len(), 1);
        assert_eq!(resolution.dependencies.as_slice()[0].full_string(), "six:1.11.0:python");
    }

    #[test]
    fn test_read_text_rejects_invalid_utf8() {
        let ctx = context(MemoryReader::new().with_file("requirements.txt", vec![0xff, 0xfe]));
        let err = ctx.read_text(Path::new("requirements.txt")).unwrap_err();
        assert!(matches!(err, ManifestError::Encoding { .. }));
    }
}

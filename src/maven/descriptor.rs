//! Typed project descriptor model decoded from pom.xml

use super::xml::{normalize_project, parse_document};
use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Group applied to build plugins that declare none
pub const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// Decoded contents of one pom.xml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectModel {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: DependencyList,
    pub dependency_management: DependencyManagement,
    pub build: BuildSection,
    pub modules: ModuleList,
}

/// `<parent>` reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub relative_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyList {
    pub dependency: Vec<DependencyItem>,
}

/// One `<dependency>` entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DependencyItem {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub scope: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyManagement {
    pub dependencies: DependencyList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildSection {
    pub plugins: PluginList,
    pub plugin_management: PluginManagement,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginList {
    pub plugin: Vec<PluginItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginManagement {
    pub plugins: PluginList,
}

/// One `<plugin>` entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginItem {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleList {
    pub module: Vec<String>,
}

impl ProjectModel {
    /// Decode a pom.xml document
    pub fn parse(path: &Path, xml: &str) -> Result<Self, ManifestError> {
        let (root, mut value) =
            parse_document(xml).map_err(|message| ManifestError::xml_parse_error(path, message))?;
        if root != "project" {
            return Err(ManifestError::xml_parse_error(
                path,
                format!("expected <project> root element, found <{}>", root),
            ));
        }

        normalize_project(&mut value);
        serde_json::from_value(value)
            .map_err(|e| ManifestError::xml_parse_error(path, e.to_string()))
    }

    /// Own group, falling back to the parent reference
    pub fn declared_group(&self) -> &str {
        if !self.group_id.is_empty() {
            return &self.group_id;
        }
        self.parent.as_ref().map_or("", |p| p.group_id.as_str())
    }

    /// Own version, falling back to the parent reference
    pub fn effective_version(&self) -> &str {
        if !self.version.is_empty() {
            return &self.version;
        }
        self.parent.as_ref().map_or("", |p| p.version.as_str())
    }

    /// Every `<dependency>` under `<dependencyManagement>`
    pub fn managed_dependencies(&self) -> &[DependencyItem] {
        &self.dependency_management.dependencies.dependency
    }
}

/// A decoded descriptor and the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDescriptor {
    pub path: PathBuf,
    pub model: ProjectModel,
}

impl ProjectDescriptor {
    /// Decode the pom.xml at `path` from its text
    pub fn parse(path: impl Into<PathBuf>, xml: &str) -> Result<Self, ManifestError> {
        let path = path.into();
        let model = ProjectModel::parse(&path, xml)?;
        Ok(Self { path, model })
    }

    /// Directory the build tool runs in
    pub fn project_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Paths of the module descriptors this project aggregates
    pub fn module_paths(&self) -> Vec<PathBuf> {
        self.model
            .modules
            .module
            .iter()
            .map(|module| module.trim())
            .filter(|module| !module.is_empty())
            .map(|module| {
                let joined = self.project_dir().join(module);
                let joined = if module.ends_with(".xml") {
                    joined
                } else {
                    joined.join("pom.xml")
                };
                normalize_lexically(&joined)
            })
            .collect()
    }
}

/// Resolve `.` and `..` components without touching the filesystem
pub fn normalize_lexically(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

//! Parser for the build tool's resolved-dependency report
//!
//! Expected output shape:
//!
//! ```text
//! [INFO] The following files have been resolved:
//! [INFO]    org.springframework:spring-core:jar:4.3.2.RELEASE:compile
//! [INFO]    junit:junit:jar:4.12:test
//! [INFO]
//! [INFO] ------------------------------------------------------------------------
//! [INFO] BUILD SUCCESS
//! ```

use crate::error::BuildToolError;
use std::collections::HashMap;
use std::path::Path;

/// Marker the tool prints when the build succeeded
pub const SUCCESS_MARKER: &str = "BUILD SUCCESS";

/// Line that opens a block of resolved artifacts
pub const RESOLVED_BANNER: &str = "The following files have been resolved:";

/// One resolved `group:artifact:packaging:version` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub group: String,
    pub artifact: String,
    pub packaging: String,
    pub version: String,
}

impl ResolvedArtifact {
    /// Parse one report line; None for lines that are not artifacts
    pub fn parse(line: &str) -> Option<Self> {
        // Newer tool versions append ` -- module name` annotations
        let coordinates = line.split_whitespace().next()?;
        let fields: Vec<&str> = coordinates.split(':').collect();
        let version = match fields.len() {
            0..=3 => return None,
            4 => fields[3],
            // group:artifact:packaging[:classifier]:version:scope
            n => fields[n - 2],
        };

        Some(Self {
            group: fields[0].to_string(),
            artifact: fields[1].to_string(),
            packaging: fields[2].to_string(),
            version: version.to_string(),
        })
    }

    /// Dependency name in `group/artifact` form, lowercased
    pub fn name(&self) -> String {
        format!("{}/{}", self.group, self.artifact).to_lowercase()
    }
}

/// Versions the build tool actually resolved, keyed by dependency name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    versions: HashMap<String, String>,
}

impl BuildReport {
    /// Parse the tool's standard output for the project in `dir`
    pub fn parse(dir: &Path, output: &str) -> Result<Self, BuildToolError> {
        if !output.contains(SUCCESS_MARKER) {
            return Err(BuildToolError::MissingSuccessMarker {
                dir: dir.to_path_buf(),
            });
        }

        let mut versions = HashMap::new();
        let mut saw_banner = false;
        let mut in_block = false;

        for raw in output.lines() {
            let line = strip_log_prefix(raw);
            if line.contains(RESOLVED_BANNER) {
                saw_banner = true;
                in_block = true;
                continue;
            }
            if !in_block {
                continue;
            }
            if line.starts_with("---") {
                in_block = false;
                continue;
            }
            if line.is_empty() || line.eq_ignore_ascii_case("none") {
                continue;
            }
            match ResolvedArtifact::parse(line) {
                // The first report block wins when a reactor prints several
                Some(artifact) => {
                    versions
                        .entry(artifact.name())
                        .or_insert_with(|| artifact.version.to_lowercase());
                }
                None => tracing::trace!(line, "ignoring report line"),
            }
        }

        if !saw_banner {
            return Err(BuildToolError::MissingReport {
                dir: dir.to_path_buf(),
            });
        }

        Ok(Self { versions })
    }

    /// Resolved version for a `group/artifact` name
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.versions.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Number of resolved artifacts
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Returns true if nothing was resolved
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

fn strip_log_prefix(line: &str) -> &str {
    let trimmed = line.trim();
    trimmed
        .strip_prefix("[INFO]")
        .map(str::trim)
        .unwrap_or(trimmed)
}

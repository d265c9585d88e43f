//! JSON output formatter for machine processing
//!
//! Schema:
//!
//! ```json
//! {
//!   "dependencies": [{"name": "six", "version": "1.11.0", "ecosystem": "python"}],
//!   "issues": ["..."],
//!   "duplicates": [],
//!   "errors": [{"path": "...", "message": "..."}]
//! }
//! ```
//!
//! Verbose mode adds `manifests`, the list of scanned files.

use crate::domain::{Dependencies, Dependency};
use crate::orchestrator::ScanResult;
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

#[derive(Serialize)]
struct JsonOutput {
    dependencies: Vec<JsonDependency>,
    issues: Vec<String>,
    duplicates: Vec<JsonDependency>,
    errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manifests: Option<Vec<String>>,
}

#[derive(Serialize)]
struct JsonDependency {
    name: String,
    version: String,
    /// Ecosystem token, empty when unknown
    ecosystem: String,
}

#[derive(Serialize)]
struct JsonError {
    path: String,
    message: String,
}

#[derive(Serialize)]
struct JsonSummary {
    dependencies: usize,
    duplicates: usize,
    issues: usize,
    errors: usize,
}

impl From<&Dependency> for JsonDependency {
    fn from(dep: &Dependency) -> Self {
        Self {
            name: dep.name.clone(),
            version: dep.version.clone(),
            ecosystem: dep.ecosystem.token().to_string(),
        }
    }
}

fn to_json_list(deps: &Dependencies) -> Vec<JsonDependency> {
    deps.iter().map(JsonDependency::from).collect()
}

fn write_pretty<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    writeln!(writer, "{}", json)
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let manifests = (self.verbosity == Verbosity::Verbose).then(|| {
            result
                .manifests
                .iter()
                .map(|p| p.display().to_string())
                .collect()
        });

        let output = JsonOutput {
            dependencies: to_json_list(&result.dependencies),
            issues: result.issues.iter().map(|i| i.to_string()).collect(),
            duplicates: to_json_list(&result.duplicates),
            errors: result
                .errors
                .iter()
                .map(|e| JsonError {
                    path: e.path.display().to_string(),
                    message: e.message.clone(),
                })
                .collect(),
            manifests,
        };

        write_pretty(&output, writer)
    }

    fn format_summary(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let summary = JsonSummary {
            dependencies: result.dependencies.len(),
            duplicates: result.duplicates.len(),
            issues: result.issues.len(),
            errors: result.errors.len(),
        };
        write_pretty(&summary, writer)
    }
}

//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues with reading or parsing a declaration file
//! - BuildToolError: Failures of the external build tool invocation
//! - ConfigError: Issues with CLI or config-file configuration
//! - AppError: Any of the above, or a failure to walk the target directory
//! - ResolveError: A failed resolve, paired with the issues recorded so far

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Issues;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Build tool related errors
    #[error(transparent)]
    BuildTool(#[from] BuildToolError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The target directory could not be walked
    #[error("failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest bytes are not valid UTF-8
    #[error("manifest file {path} is not valid UTF-8")]
    Encoding { path: PathBuf },

    /// JSON parsing error (package.json)
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// YAML parsing error (glide, Conda environment and recipe files)
    #[error("failed to parse YAML in {path}: {message}")]
    YamlParseError { path: PathBuf, message: String },

    /// XML parsing error (pom.xml)
    #[error("failed to parse XML in {path}: {message}")]
    XmlParseError { path: PathBuf, message: String },

    /// A declaration line matched none of the expected patterns
    #[error("unrecognized declaration '{line}' in {path}")]
    UnmatchedLine { path: PathBuf, line: String },

    /// Unsupported manifest format
    #[error("unsupported manifest format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// A dependency string could not be reconstructed
    #[error("invalid dependency string '{value}': {message}")]
    InvalidDependencyString { value: String, message: String },
}

/// Errors related to the external build tool
#[derive(Error, Debug)]
pub enum BuildToolError {
    /// The tool could not be started
    #[error("failed to run '{program}' in {dir}: {source}")]
    Spawn {
        program: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but did not report success
    #[error("'{program}' did not report success in {dir}")]
    Failed { program: String, dir: PathBuf },

    /// The tool output lacks the `BUILD SUCCESS` marker
    #[error("build tool output for {dir} lacks the success marker")]
    MissingSuccessMarker { dir: PathBuf },

    /// The tool output lacks the resolved-files report
    #[error("no resolved-files report in build tool output for {dir}")]
    MissingReport { dir: PathBuf },

    /// The shared tool lock could not be acquired
    #[error("failed to acquire build tool lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No canned output was registered for a directory
    #[error("no build tool output registered for {dir}")]
    NoOutput { dir: PathBuf },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unexpected keys
    #[error("invalid config file {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    /// Invalid path
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: PathBuf, message: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },
}

/// The underlying cause of a failed resolve
#[derive(Error, Debug)]
pub enum ResolveFailure {
    /// The declaration file could not be read or parsed
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The build tool failed where no fallback exists
    #[error(transparent)]
    BuildTool(#[from] BuildToolError),

    /// The blocking resolver task panicked or was cancelled
    #[error("resolver task failed: {0}")]
    Task(String),
}

/// A failed resolve together with the issues accumulated before the failure
#[derive(Error, Debug)]
#[error("{failure}")]
pub struct ResolveError {
    /// What went wrong
    #[source]
    pub failure: ResolveFailure,
    /// Issues recorded before the failure
    pub issues: Issues,
}

impl ResolveError {
    /// Creates a new ResolveError
    pub fn new(failure: impl Into<ResolveFailure>, issues: Issues) -> Self {
        ResolveError {
            failure: failure.into(),
            issues,
        }
    }
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new YamlParseError
    pub fn yaml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::YamlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new XmlParseError
    pub fn xml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::XmlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new UnmatchedLine error
    pub fn unmatched_line(path: impl Into<PathBuf>, line: impl Into<String>) -> Self {
        ManifestError::UnmatchedLine {
            path: path.into(),
            line: line.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Issue;

    #[test]
    fn test_manifest_error_json_parse() {
        let err = ManifestError::json_parse_error("/path/to/package.json", "unexpected token");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse JSON"));
        assert!(msg.contains("unexpected token"));
    }

    #[test]
    fn test_manifest_error_unmatched_line() {
        let err = ManifestError::unmatched_line("requirements.txt", "foo~=1.0");
        let msg = format!("{}", err);
        assert!(msg.contains("unrecognized declaration"));
        assert!(msg.contains("foo~=1.0"));
    }

    #[test]
    fn test_manifest_error_read() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ManifestError::read_error("/x/pom.xml", io);
        assert!(format!("{}", err).contains("failed to read manifest file"));
    }

    #[test]
    fn test_build_tool_error_failed() {
        let err = BuildToolError::Failed {
            program: "mvn".to_string(),
            dir: PathBuf::from("/repo/app"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("did not report success"));
        assert!(msg.contains("/repo/app"));
    }

    #[test]
    fn test_config_error_conflicting_options() {
        let err = ConfigError::ConflictingOptions {
            message: "--quiet and --verbose cannot be used together".to_string(),
        };
        assert!(format!("{}", err).contains("conflicting options"));
    }

    #[test]
    fn test_resolve_error_keeps_issues() {
        let issues: Issues = vec![Issue::missing_version("six")].into_iter().collect();
        let err = ResolveError::new(
            ManifestError::yaml_parse_error("environment.yml", "bad indent"),
            issues,
        );
        assert_eq!(err.issues.len(), 1);
        assert!(format!("{}", err).contains("bad indent"));
    }

    #[test]
    fn test_app_error_from_manifest_error() {
        let app_err: AppError = ManifestError::xml_parse_error("pom.xml", "eof").into();
        assert!(format!("{}", app_err).contains("failed to parse XML"));
    }

    #[test]
    fn test_app_error_from_build_tool_error() {
        let app_err: AppError = BuildToolError::MissingReport {
            dir: PathBuf::from("/x"),
        }
        .into();
        assert!(format!("{}", app_err).contains("resolved-files report"));
    }
}

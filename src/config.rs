//! Configuration loading for depaudit
//!
//! Settings come from (lowest to highest priority):
//! - Built-in defaults
//! - `depaudit.toml` in the target directory, or the file named by `--config`
//! - Command-line flags
//!
//! Example file:
//!
//! ```toml
//! include_test = true
//! concurrency = 4
//! lock_file = ".m2.lock"
//! exclude = ["third_party"]
//!
//! [build_tool]
//! program = "./mvnw"
//! args = ["-q", "dependency:resolve", "-B"]
//! ```

use crate::build_tool::{MavenCli, ToolLock, DEFAULT_MAVEN_ARGS, DEFAULT_MAVEN_PROGRAM};
use crate::cli::CliArgs;
use crate::error::ConfigError;
use crate::manifest::ResolverContext;
use crate::reader::FsReader;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the config file discovered in the target directory
pub const CONFIG_FILE_NAME: &str = "depaudit.toml";

/// Default maximum number of manifests resolved at once
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Directory names the scanner never descends into
pub const DEFAULT_EXCLUDES: &[&str] = &[".git", "node_modules", "target"];

/// Contents of a config file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub include_test: Option<bool>,
    pub build_tool: BuildToolConfig,
    pub lock_file: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub exclude: Vec<String>,
}

/// `[build_tool]` table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildToolConfig {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
}

impl FileConfig {
    /// Load a config file
    ///
    /// A relative `lock_file` is taken relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content, path)?;

        if let Some(lock) = &config.lock_file {
            if lock.is_relative() {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                config.lock_file = Some(base.join(lock));
            }
        }
        Ok(config)
    }

    /// Parse config text; `path` is used for error messages only
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: FileConfig = toml::from_str(content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if config.concurrency == Some(0) {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                message: "concurrency must be at least 1".to_string(),
            });
        }
        Ok(config)
    }
}

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory to scan
    pub root: PathBuf,
    pub include_test: bool,
    /// Build tool program
    pub program: String,
    /// Build tool arguments
    pub args: Vec<String>,
    /// Cross-process build tool lock, if any
    pub lock_file: Option<PathBuf>,
    pub concurrency: usize,
    /// Directory names skipped by the scanner
    pub exclude: BTreeSet<String>,
    pub json: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub fail_on_issues: bool,
}

impl Settings {
    /// Build settings from CLI arguments, reading the config file if present
    pub fn from_cli(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = match args.config_path() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config file");
                FileConfig::load(&path)?
            }
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    /// Overlay CLI arguments on a loaded config file
    pub fn merge(args: &CliArgs, file: FileConfig) -> Result<Self, ConfigError> {
        if args.quiet && args.verbose {
            return Err(ConfigError::ConflictingOptions {
                message: "--quiet and --verbose cannot be used together".to_string(),
            });
        }
        if !args.path.is_dir() {
            return Err(ConfigError::InvalidPath {
                path: args.path.clone(),
                message: "not a directory".to_string(),
            });
        }

        let mut exclude: BTreeSet<String> =
            DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
        exclude.extend(file.exclude);
        exclude.extend(args.exclude.iter().cloned());

        Ok(Self {
            root: args.path.clone(),
            include_test: args.include_test || file.include_test.unwrap_or(false),
            program: args
                .mvn
                .clone()
                .or(file.build_tool.program)
                .unwrap_or_else(|| DEFAULT_MAVEN_PROGRAM.to_string()),
            args: file
                .build_tool
                .args
                .unwrap_or_else(|| DEFAULT_MAVEN_ARGS.iter().map(|a| a.to_string()).collect()),
            lock_file: args.lock_file.clone().or(file.lock_file),
            concurrency: args
                .concurrency
                .or(file.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY),
            exclude,
            json: args.json,
            quiet: args.quiet,
            verbose: args.verbose,
            fail_on_issues: args.fail_on_issues,
        })
    }

    /// Resolver context backed by the filesystem and the configured build tool
    pub fn resolver_context(&self) -> ResolverContext {
        let tool = MavenCli::new()
            .with_program(&self.program)
            .with_args(self.args.iter().cloned());
        let mut lock = ToolLock::new(self.program.clone());
        if let Some(path) = &self.lock_file {
            lock = lock.with_file(path);
        }
        ResolverContext::new(Arc::new(FsReader), Arc::new(tool)).with_tool_lock(Arc::new(lock))
    }
}

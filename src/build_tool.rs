//! External build tool integration for ground-truth dependency resolution
//!
//! This module provides:
//! - The [`BuildTool`] seam used by the Maven resolver
//! - [`MavenCli`], which runs `mvn dependency:resolve` in a project directory
//! - [`StaticBuildTool`], which serves canned reports for tests
//! - [`ToolLock`], the advisory lock serializing invocations that share a
//!   local tool cache

use crate::error::BuildToolError;
use fs4::fs_std::FileExt;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Mutex;

/// Default program used to resolve Maven projects
pub const DEFAULT_MAVEN_PROGRAM: &str = "mvn";

/// Default arguments for dependency-resolution mode
pub const DEFAULT_MAVEN_ARGS: &[&str] = &["dependency:resolve", "-B"];

/// Trait for running a build tool in dependency-resolution mode
pub trait BuildTool: Send + Sync {
    /// Run the tool in `project_dir` and return its standard output
    fn resolve(&self, project_dir: &Path) -> Result<String, BuildToolError>;

    /// Human-readable tool name, used in logs
    fn name(&self) -> &str;
}

/// Build tool backed by the Maven command-line client
#[derive(Debug, Clone)]
pub struct MavenCli {
    program: String,
    args: Vec<String>,
}

impl MavenCli {
    /// Create a runner using `mvn` from PATH
    pub fn new() -> Self {
        Self {
            program: DEFAULT_MAVEN_PROGRAM.to_string(),
            args: DEFAULT_MAVEN_ARGS.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Use a different program (builder pattern)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Replace the argument list (builder pattern)
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the full command line for logging
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn run_command(&self, working_dir: &Path) -> std::io::Result<Output> {
        Command::new(&self.program)
            .args(&self.args)
            .current_dir(working_dir)
            .output()
    }
}

impl Default for MavenCli {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildTool for MavenCli {
    fn resolve(&self, project_dir: &Path) -> Result<String, BuildToolError> {
        tracing::debug!(dir = %project_dir.display(), command = %self.command_line(), "running build tool");

        let output = self
            .run_command(project_dir)
            .map_err(|source| BuildToolError::Spawn {
                program: self.program.clone(),
                dir: project_dir.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            tracing::debug!(
                dir = %project_dir.display(),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "build tool exited with failure"
            );
            return Err(BuildToolError::Failed {
                program: self.program.clone(),
                dir: project_dir.to_path_buf(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Build tool serving fixed reports keyed by project directory
///
/// Directories without a registered report fail, which lets tests exercise
/// the failure policy of the Maven resolver.
#[derive(Debug, Default, Clone)]
pub struct StaticBuildTool {
    outputs: HashMap<PathBuf, String>,
}

impl StaticBuildTool {
    /// Create a tool with no reports
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the report for a directory (builder pattern)
    pub fn with_output(mut self, dir: impl Into<PathBuf>, output: impl Into<String>) -> Self {
        self.outputs.insert(dir.into(), output.into());
        self
    }
}

impl BuildTool for StaticBuildTool {
    fn resolve(&self, project_dir: &Path) -> Result<String, BuildToolError> {
        self.outputs
            .get(project_dir)
            .cloned()
            .ok_or_else(|| BuildToolError::NoOutput {
                dir: project_dir.to_path_buf(),
            })
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Named advisory lock around build tool invocations
///
/// Holds an in-process mutex and, when configured with a path, an
/// exclusive file lock so separate processes sharing one tool cache are
/// serialized as well. The lock is held only while the closure runs.
#[derive(Debug)]
pub struct ToolLock {
    name: String,
    path: Option<PathBuf>,
    inner: Mutex<()>,
}

impl ToolLock {
    /// Create an in-process lock
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            inner: Mutex::new(()),
        }
    }

    /// Also take an exclusive lock on `path` (builder pattern)
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the lock name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `f` while holding the lock
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> Result<T, BuildToolError> {
        // A panic in another holder does not invalidate the shared cache
        let _guard = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let _file = match &self.path {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .truncate(false)
                    .write(true)
                    .open(path)
                    .map_err(|source| BuildToolError::Lock {
                        path: path.clone(),
                        source,
                    })?;
                file.lock_exclusive().map_err(|source| BuildToolError::Lock {
                    path: path.clone(),
                    source,
                })?;
                Some(file)
            }
            None => None,
        };

        tracing::trace!(lock = %self.name, "build tool lock acquired");
        Ok(f())
    }
}

impl Default for ToolLock {
    fn default() -> Self {
        Self::new("build-tool")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_maven_cli_command_line() {
        let cli = MavenCli::new();
        assert_eq!(cli.command_line(), "mvn dependency:resolve -B");

        let custom = MavenCli::new().with_program("./mvnw").with_args(["-q", "dependency:resolve"]);
        assert_eq!(custom.command_line(), "./mvnw -q dependency:resolve");
        assert_eq!(custom.name(), "./mvnw");
    }

    #[test]
    fn test_maven_cli_missing_program() {
        let cli = MavenCli::new().with_program("nonexistent_build_tool_xyz_123");
        let temp_dir = tempfile::tempdir().unwrap();
        let err = cli.resolve(temp_dir.path()).unwrap_err();
        assert!(matches!(err, BuildToolError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_maven_cli_captures_stdout() {
        let cli = MavenCli::new().with_program("echo").with_args(["BUILD SUCCESS"]);
        let temp_dir = tempfile::tempdir().unwrap();
        let out = cli.resolve(temp_dir.path()).unwrap();
        assert_eq!(out.trim(), "BUILD SUCCESS");
    }

    #[cfg(unix)]
    #[test]
    fn test_maven_cli_nonzero_exit() {
        let cli = MavenCli::new().with_program("false").with_args(Vec::<String>::new());
        let temp_dir = tempfile::tempdir().unwrap();
        let err = cli.resolve(temp_dir.path()).unwrap_err();
        assert!(matches!(err, BuildToolError::Failed { .. }));
    }

    #[test]
    fn test_static_build_tool() {
        let tool = StaticBuildTool::new().with_output("/repo", "BUILD SUCCESS");
        assert_eq!(tool.resolve(Path::new("/repo")).unwrap(), "BUILD SUCCESS");
        assert!(matches!(
            tool.resolve(Path::new("/other")),
            Err(BuildToolError::NoOutput { .. })
        ));
    }

    #[test]
    fn test_tool_lock_runs_closure() {
        let lock = ToolLock::new("maven");
        assert_eq!(lock.name(), "maven");
        assert_eq!(lock.run(|| 42).unwrap(), 42);
    }

    #[test]
    fn test_tool_lock_with_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tool.lock");
        let lock = ToolLock::new("maven").with_file(&path);
        assert_eq!(lock.run(|| "ok").unwrap(), "ok");
        assert!(path.exists());
        // Released after the first call
        assert_eq!(lock.run(|| "again").unwrap(), "again");
    }

    #[test]
    fn test_tool_lock_serializes_threads() {
        let lock = Arc::new(ToolLock::default());
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = Arc::clone(&lock);
                let active = Arc::clone(&active);
                let max_seen = Arc::clone(&max_seen);
                std::thread::spawn(move || {
                    lock.run(|| {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(5));
                        active.fetch_sub(1, Ordering::SeqCst);
                    })
                    .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}

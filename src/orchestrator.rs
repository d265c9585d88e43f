//! Orchestrator for the audit workflow
//!
//! Coordinates the complete flow:
//! 1. Walk the target directory for recognized manifests
//! 2. Resolve each manifest on a blocking task, bounded by a semaphore
//! 3. Resolve every pom.xml of the tree together so hierarchies link
//!    across directories
//! 4. Collect dependencies, issues and per-file failures
//! 5. Deduplicate and sort

use crate::config::Settings;
use crate::domain::{Dependencies, Issues};
use crate::error::{AppError, ResolveError, ResolveFailure};
use crate::manifest::{resolve_manifest, ManifestKind, ResolveResult, ResolverContext};
use crate::maven;
use crate::progress::Progress;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Finds manifest files below a root directory
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    exclude: BTreeSet<String>,
}

impl Scanner {
    /// Create a scanner for `root` that skips nothing
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: BTreeSet::new(),
        }
    }

    /// Skip directories with any of these names (builder pattern)
    pub fn with_excludes(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// Walk the tree and return recognized manifests in path order
    ///
    /// Failing to read the root is an error; unreadable subdirectories are
    /// logged and skipped. Symlinked directories are not followed.
    pub fn scan(&self) -> Result<Vec<PathBuf>, AppError> {
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];
        let mut is_root = true;

        while let Some(dir) = pending.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(source) if is_root => return Err(AppError::Scan { path: dir, source }),
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                    continue;
                }
            };
            is_root = false;

            for entry in entries.flatten() {
                let path = entry.path();
                let Ok(file_type) = entry.file_type() else {
                    continue;
                };
                if file_type.is_dir() {
                    let name = entry.file_name();
                    if !self.exclude.contains(name.to_string_lossy().as_ref()) {
                        pending.push(path);
                    }
                } else if ManifestKind::from_path(&path).is_some() {
                    found.push(path);
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

/// A manifest that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    /// Manifest (or descriptor tree root) that failed
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for ScanError {}

/// Result of auditing a directory tree
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Manifests found by the scanner
    pub manifests: Vec<PathBuf>,
    /// Unique dependencies, sorted by ecosystem then name
    pub dependencies: Dependencies,
    /// Repeats removed by deduplication
    pub duplicates: Dependencies,
    /// Issues from every manifest, including failed ones, sorted
    pub issues: Issues,
    /// Manifests that failed to resolve
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    /// Returns true if some manifest failed
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if any issue was recorded
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Main orchestrator for the audit workflow
pub struct Orchestrator {
    settings: Settings,
    ctx: ResolverContext,
    semaphore: Arc<Semaphore>,
}

impl Orchestrator {
    /// Create an orchestrator using the real filesystem and build tool
    pub fn new(settings: Settings) -> Self {
        let ctx = settings.resolver_context();
        Self::with_context(settings, ctx)
    }

    /// Create an orchestrator with an injected resolver context
    pub fn with_context(settings: Settings, ctx: ResolverContext) -> Self {
        let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
        Self {
            settings,
            ctx,
            semaphore,
        }
    }

    /// Run the audit workflow without progress display
    pub async fn run(&self) -> Result<ScanResult, AppError> {
        self.run_with_progress(false).await
    }

    /// Run the audit workflow
    pub async fn run_with_progress(&self, show_progress: bool) -> Result<ScanResult, AppError> {
        let mut progress = Progress::new(show_progress);

        progress.spinner("Scanning for manifest files...");
        let scanner = Scanner::new(&self.settings.root)
            .with_excludes(self.settings.exclude.iter().cloned());
        let manifests = scanner.scan()?;
        progress.finish_and_clear();

        let (poms, others): (Vec<PathBuf>, Vec<PathBuf>) = manifests
            .iter()
            .cloned()
            .partition(|p| ManifestKind::from_path(p) == Some(ManifestKind::PomXml));

        let mut tasks = JoinSet::new();
        for path in others {
            self.spawn_manifest(&mut tasks, path);
        }
        if !poms.is_empty() {
            self.spawn_project_set(&mut tasks, poms);
        }

        progress.start(tasks.len() as u64, "Resolving manifests");
        let mut outcomes = Vec::new();
        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(batch) => outcomes.extend(batch),
                Err(e) => errors.push(ScanError {
                    path: self.settings.root.clone(),
                    message: format!("resolver task failed: {}", e),
                }),
            }
            progress.inc();
        }
        progress.finish_and_clear();

        let mut result = collect(outcomes);
        result.errors.extend(errors);
        result.errors.sort_by(|a, b| a.path.cmp(&b.path));
        result.manifests = manifests;

        tracing::info!(
            manifests = result.manifests.len(),
            dependencies = result.dependencies.len(),
            duplicates = result.duplicates.len(),
            issues = result.issues.len(),
            errors = result.errors.len(),
            "scan complete"
        );
        Ok(result)
    }

    fn spawn_manifest(&self, tasks: &mut JoinSet<Vec<(PathBuf, ResolveResult)>>, path: PathBuf) {
        let ctx = self.ctx.clone();
        let semaphore = Arc::clone(&self.semaphore);
        let include_test = self.settings.include_test;
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return Vec::new();
            };
            let task_path = path.clone();
            let joined =
                tokio::task::spawn_blocking(move || resolve_manifest(&ctx, &task_path, include_test))
                    .await;
            vec![(path, flatten_join(joined))]
        });
    }

    fn spawn_project_set(&self, tasks: &mut JoinSet<Vec<(PathBuf, ResolveResult)>>, poms: Vec<PathBuf>) {
        let ctx = self.ctx.clone();
        let semaphore = Arc::clone(&self.semaphore);
        let include_test = self.settings.include_test;
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return Vec::new();
            };
            let first = poms.first().cloned().unwrap_or_default();
            let joined = tokio::task::spawn_blocking(move || {
                maven::resolve_project_set(&ctx, &poms, include_test)
            })
            .await;
            match joined {
                Ok(outcomes) => outcomes.into_iter().map(|o| (o.root, o.result)).collect(),
                Err(e) => vec![(first, Err(join_failure(e)))],
            }
        });
    }
}

fn flatten_join(joined: Result<ResolveResult, tokio::task::JoinError>) -> ResolveResult {
    joined.unwrap_or_else(|e| Err(join_failure(e)))
}

fn join_failure(e: tokio::task::JoinError) -> ResolveError {
    ResolveError::new(ResolveFailure::Task(e.to_string()), Issues::new())
}

/// Fold per-file outcomes into one deduplicated, sorted result
fn collect(outcomes: Vec<(PathBuf, ResolveResult)>) -> ScanResult {
    let mut dependencies = Dependencies::new();
    let mut issues = Issues::new();
    let mut errors = Vec::new();

    for (path, outcome) in outcomes {
        match outcome {
            Ok(resolution) => {
                tracing::debug!(
                    path = %path.display(),
                    dependencies = resolution.dependencies.len(),
                    issues = resolution.issues.len(),
                    "resolved"
                );
                dependencies.append(resolution.dependencies);
                issues.append(resolution.issues);
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "resolve failed");
                issues.append(e.issues);
                errors.push(ScanError {
                    path,
                    message: e.failure.to_string(),
                });
            }
        }
    }

    dependencies.sort();
    let (dependencies, duplicates) = dependencies.dedup();

    ScanResult {
        manifests: Vec::new(),
        dependencies,
        duplicates,
        issues: issues.sorted(),
        errors,
    }
}

/// Returns true if `path` is a manifest the orchestrator would resolve
pub fn is_manifest(path: &Path) -> bool {
    ManifestKind::from_path(path).is_some()
}

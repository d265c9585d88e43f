//! CLI argument parsing module for depaudit

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Parse a worker count; zero is rejected
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", s))?;
    if n == 0 {
        return Err("concurrency must be at least 1".to_string());
    }
    Ok(n)
}

/// Multi-ecosystem dependency declaration auditor
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depaudit",
    version,
    about = "Resolve declared dependencies across ecosystems and report declaration issues"
)]
pub struct CliArgs {
    /// Target directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    // General options
    /// Enable verbose output (debug logging)
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Read settings from this file instead of <path>/depaudit.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // Resolution options
    /// Include test and development dependencies
    #[arg(long, visible_alias = "dev")]
    pub include_test: bool,

    /// Program used to resolve Maven projects
    #[arg(long = "mvn", value_name = "PROGRAM")]
    pub mvn: Option<String>,

    /// File lock shared with other processes using the same build tool cache
    #[arg(long, value_name = "PATH")]
    pub lock_file: Option<PathBuf>,

    /// Maximum number of manifests resolved at once
    #[arg(long, value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Skip directories with this name (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub exclude: Vec<String>,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Exit with status 3 when any issue was recorded
    #[arg(long)]
    pub fail_on_issues: bool,
}

impl CliArgs {
    /// Location of the config file to read, if any
    ///
    /// An explicit `--config` is returned as-is; otherwise `depaudit.toml`
    /// in the target directory is used when it exists.
    pub fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config {
            return Some(path.clone());
        }
        let default = self.path.join(crate::config::CONFIG_FILE_NAME);
        default.is_file().then_some(default)
    }
}

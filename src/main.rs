//! depaudit - Multi-ecosystem dependency declaration auditor
//!
//! Scans a directory tree for manifests (pom.xml, package.json, glide.yaml,
//! requirements.txt, environment.yml, meta.yaml), resolves the declared
//! dependencies and reports declaration issues.

use clap::Parser;
use depaudit::cli::CliArgs;
use depaudit::config::Settings;
use depaudit::orchestrator::Orchestrator;
use depaudit::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Some manifests could not be resolved
const EXIT_PARTIAL: u8 = 2;
/// `--fail-on-issues` was set and issues were recorded
const EXIT_ISSUES: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let settings = Settings::from_cli(&args)?;
    tracing::debug!(
        root = %settings.root.display(),
        include_test = settings.include_test,
        build_tool = %settings.program,
        concurrency = settings.concurrency,
        "starting scan"
    );

    let show_progress = !settings.quiet && !settings.json && !settings.verbose;
    let orchestrator = Orchestrator::new(settings.clone());
    let result = orchestrator.run_with_progress(show_progress).await?;

    let output_config = OutputConfig::from_cli(settings.json, settings.verbose, settings.quiet);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    if result.has_errors() {
        Ok(ExitCode::from(EXIT_PARTIAL))
    } else if settings.fail_on_issues && result.has_issues() {
        Ok(ExitCode::from(EXIT_ISSUES))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

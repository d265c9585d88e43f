//! Text output formatter for human-readable display
//!
//! Dependencies are grouped by ecosystem with aligned names, followed by the
//! recorded issues, any per-file failures and a summary line.

use crate::domain::{Dependency, Ecosystem};
use crate::orchestrator::ScanResult;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn heading(&self, text: &str, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.color {
            writeln!(writer, "{}", text.bold())
        } else {
            writeln!(writer, "{}", text)
        }
    }

    fn format_dependency_line(
        &self,
        dep: &Dependency,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let name = format!("{:width$}", dep.name, width = width);
        match (self.color, dep.has_version()) {
            (true, true) => writeln!(writer, "  {} {}", name, dep.version.bright_white()),
            (true, false) => writeln!(writer, "  {} {}", name, "(no version)".yellow()),
            (false, true) => writeln!(writer, "  {} {}", name, dep.version),
            (false, false) => writeln!(writer, "  {} (no version)", name),
        }
    }

    fn format_group(
        &self,
        ecosystem: Ecosystem,
        deps: &[&Dependency],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let header = format!("{} ({})", ecosystem.display_name(), deps.len());
        self.heading(&header, writer)?;

        let width = deps.iter().map(|d| d.name.len()).max().unwrap_or(0).max(20);
        for dep in deps {
            self.format_dependency_line(dep, width, writer)?;
        }
        writeln!(writer)
    }

    fn format_dependencies(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let known = Ecosystem::all().iter().copied();
        for ecosystem in std::iter::once(Ecosystem::Unknown).chain(known) {
            let group: Vec<&Dependency> = result
                .dependencies
                .iter()
                .filter(|d| d.ecosystem == ecosystem)
                .collect();
            if !group.is_empty() {
                self.format_group(ecosystem, &group, writer)?;
            }
        }
        Ok(())
    }

    fn format_issues(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if result.issues.is_empty() {
            return Ok(());
        }
        self.heading(&format!("Issues ({})", result.issues.len()), writer)?;
        for issue in &result.issues {
            if self.color {
                writeln!(writer, "  {} {}", "!".yellow(), issue)?;
            } else {
                writeln!(writer, "  ! {}", issue)?;
            }
        }
        writeln!(writer)
    }

    fn format_errors(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if result.errors.is_empty() {
            return Ok(());
        }
        self.heading(&format!("Errors ({})", result.errors.len()), writer)?;
        for error in &result.errors {
            if self.color {
                writeln!(writer, "  {} {}", "x".red(), error)?;
            } else {
                writeln!(writer, "  x {}", error)?;
            }
        }
        writeln!(writer)
    }

    fn format_verbose_details(
        &self,
        result: &ScanResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.heading(&format!("Manifests ({})", result.manifests.len()), writer)?;
        for path in &result.manifests {
            writeln!(writer, "  {}", path.display())?;
        }
        writeln!(writer)?;

        if !result.duplicates.is_empty() {
            self.heading(&format!("Duplicates ({})", result.duplicates.len()), writer)?;
            for dep in &result.duplicates {
                writeln!(writer, "  {}", dep.full_string())?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Quiet {
            if self.verbosity == Verbosity::Verbose {
                self.format_verbose_details(result, writer)?;
            }
            self.format_dependencies(result, writer)?;
            self.format_issues(result, writer)?;
        }
        self.format_errors(result, writer)?;
        self.format_summary(result, writer)
    }

    fn format_summary(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let deps = result.dependencies.len();
        let issues = result.issues.len();
        let errors = result.errors.len();
        let count = |n: usize, one: &str, many: &str| {
            format!("{} {}", n, if n == 1 { one } else { many })
        };
        let deps_display = count(deps, "dependency", "dependencies");

        if self.color {
            let issues_display = if issues == 0 {
                count(issues, "issue", "issues").green().to_string()
            } else {
                count(issues, "issue", "issues").yellow().to_string()
            };
            let errors_display = if errors == 0 {
                count(errors, "error", "errors").dimmed().to_string()
            } else {
                count(errors, "error", "errors").red().to_string()
            };
            writeln!(
                writer,
                "{}, {}, {}",
                deps_display.bold(),
                issues_display,
                errors_display
            )
        } else {
            writeln!(
                writer,
                "{}, {}, {}",
                deps_display,
                count(issues, "issue", "issues"),
                count(errors, "error", "errors")
            )
        }
    }
}

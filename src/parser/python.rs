//! pip requirement line parser
//!
//! Handles line formats:
//! - Exact: `name==1.2.3`
//! - Bounded: `name>=1.2.3`, `name<=1.2.3` (flagged as weak)
//! - Bare: `name` (flagged as missing a version)
//! - VCS: `git+https://host/org/repo.git@ref#egg=name`
//!
//! Blank lines, comments, include directives, pip options and local path
//! references are skipped. Per-requirement options (`--hash=...`) after a
//! declaration are dropped.

use crate::domain::Ecosystem;
use crate::parser::{parse_vcs_reference, Constraint, Requirement, RequirementParser};
use regex::Regex;
use std::sync::LazyLock;

/// pip requirement parser (plain pattern only)
pub struct PipRequirementParser;

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([A-Za-z0-9][A-Za-z0-9._-]*)(?:\[[^\]]*\])?\s*(?:(==|>=|<=)\s*([A-Za-z0-9][A-Za-z0-9._+!*-]*))?$",
    )
    .unwrap()
});

// Path fragments that point into an interpreter installation or the local tree
const PATH_FRAGMENTS: &[&str] = &["site-packages", "dist-packages", "lib/python"];

/// Result of classifying one line of a requirements file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipLine {
    /// Nothing to resolve on this line
    Skip,
    /// A declaration
    Requirement(Requirement),
    /// The line matches no known pattern
    Unmatched,
}

impl RequirementParser for PipRequirementParser {
    fn parse(&self, spec: &str) -> Option<Requirement> {
        let caps = REQUIREMENT_RE.captures(spec.trim())?;
        let name = caps.get(1)?.as_str();

        match (caps.get(2), caps.get(3)) {
            (Some(comparator), Some(version)) => {
                let constraint = if comparator.as_str() == "==" {
                    Constraint::Exact
                } else {
                    Constraint::Weak(comparator.as_str().to_string())
                };
                Some(Requirement::new(name, version.as_str(), constraint))
            }
            _ => Some(Requirement::new(name, "", Constraint::Missing)),
        }
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Python
    }
}

/// Classify and parse a single requirements-file line
pub fn parse_pip_line(line: &str) -> PipLine {
    let line = strip_trailing_options(strip_inline_comment(line).trim());

    if line.is_empty() || line.starts_with('#') {
        return PipLine::Skip;
    }

    // Editable installs are only interesting when they point at a repository
    let line = match line.strip_prefix("-e ").or_else(|| line.strip_prefix("--editable ")) {
        Some(rest) => rest.trim(),
        None if line.starts_with('-') => return PipLine::Skip,
        None => line,
    };

    if is_path_fragment(line) {
        return PipLine::Skip;
    }

    if let Some(vcs) = parse_vcs_reference(line) {
        let version = vcs.reference.unwrap_or_default();
        return PipLine::Requirement(Requirement::new(vcs.repository, version, Constraint::Exact));
    }

    // Environment markers do not affect the declared version
    let line = line.split(';').next().unwrap_or(line).trim();

    match PipRequirementParser.parse(line) {
        Some(req) => PipLine::Requirement(req),
        None => PipLine::Unmatched,
    }
}

fn strip_inline_comment(line: &str) -> &str {
    match line.find(" #") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn strip_trailing_options(line: &str) -> &str {
    line.char_indices()
        .find(|&(i, c)| c.is_whitespace() && line[i..].trim_start().starts_with("--"))
        .map_or(line, |(i, _)| line[..i].trim_end())
}

fn is_path_fragment(line: &str) -> bool {
    line.starts_with('.')
        || line.starts_with('/')
        || line.starts_with("file:")
        || PATH_FRAGMENTS.iter().any(|f| line.contains(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(line: &str) -> Requirement {
        match parse_pip_line(line) {
            PipLine::Requirement(req) => req,
            other => panic!("expected requirement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_exact() {
        let req = requirement("requests==2.28.0");
        assert_eq!(req.name, "requests");
        assert_eq!(req.version, "2.28.0");
        assert_eq!(req.constraint, Constraint::Exact);
        assert!(req.issue().is_none());
    }

    #[test]
    fn test_parse_weak_gte() {
        let req = requirement("kcilc>=0.6");
        assert_eq!(req.name, "kcilc");
        assert_eq!(req.version, "0.6");
        assert_eq!(req.constraint, Constraint::Weak(">=".to_string()));
        let issue = req.issue().unwrap();
        assert!(issue.as_str().contains(">="));
        assert!(issue.as_str().contains("0.6"));
    }

    #[test]
    fn test_parse_weak_lte_with_spaces() {
        let req = requirement("boto3 <= 1.9.0");
        assert_eq!(req.version, "1.9.0");
        assert_eq!(req.constraint, Constraint::Weak("<=".to_string()));
    }

    #[test]
    fn test_parse_bare_name_is_missing() {
        let req = requirement("flask");
        assert_eq!(req.version, "");
        assert_eq!(req.constraint, Constraint::Missing);
    }

    #[test]
    fn test_parse_extras_dropped_from_name() {
        let req = requirement("celery[redis]==4.2.1");
        assert_eq!(req.name, "celery");
        assert_eq!(req.version, "4.2.1");
    }

    #[test]
    fn test_parse_vcs_line() {
        let req = requirement("git+https://github.com/happy/place.git@v0.1.8#egg=some-thing");
        assert_eq!(req.name, "place");
        assert_eq!(req.version, "v0.1.8");
        assert_eq!(req.constraint, Constraint::Exact);
    }

    #[test]
    fn test_parse_editable_vcs_line() {
        let req = requirement("-e git+https://github.com/org/lib.git@1.0#egg=lib");
        assert_eq!(req.name, "lib");
        assert_eq!(req.version, "1.0");
    }

    #[test]
    fn test_parse_inline_comment_and_marker() {
        let req = requirement("six==1.11.0 ; python_version < '3' # compat");
        assert_eq!(req.name, "six");
        assert_eq!(req.version, "1.11.0");
    }

    #[test]
    fn test_parse_drops_hash_options() {
        let req = requirement("flask==1.0.2  --hash=sha256:abcdef --hash=sha256:012345");
        assert_eq!(req.name, "flask");
        assert_eq!(req.version, "1.0.2");
        assert_eq!(req.constraint, Constraint::Exact);

        let editable = requirement("--editable git+https://github.com/org/lib.git@1.0#egg=lib");
        assert_eq!(editable.name, "lib");
    }

    #[test]
    fn test_skips() {
        for line in [
            "",
            "   ",
            "# comment",
            "-r base.txt",
            "--index-url https://pypi.org/simple",
            "-e .",
            "--hash=sha256:abcdef",
            "./local/pkg",
            "/usr/lib/python2.7/site-packages/foo",
        ] {
            assert_eq!(parse_pip_line(line), PipLine::Skip, "line {:?}", line);
        }
    }

    #[test]
    fn test_unmatched() {
        assert_eq!(parse_pip_line("foo~=1.0"), PipLine::Unmatched);
        assert_eq!(parse_pip_line("foo>=1.0,<2.0"), PipLine::Unmatched);
    }

    #[test]
    fn test_ecosystem() {
        assert_eq!(PipRequirementParser.ecosystem(), Ecosystem::Python);
    }
}

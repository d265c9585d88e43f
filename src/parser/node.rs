//! npm version specification parser
//!
//! Handles version formats:
//! - VCS: `git+https://github.com/org/repo.git#v1.2.3`
//! - Exact: `1.2.3`, `=1.2.3`
//! - Bounded: `^1.2.3`, `~1.2.3`, `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`
//! - Unbounded: `*`, `x`, `latest`
//! - Aliases: `npm:lodash@4.17.21` (classified by the aliased spec)
//! - Non-registry sources: `file:../pkg`, `link:`, tarball URLs (no version)

use crate::parser::{parse_vcs_reference, Constraint};

// Longer comparators must come first so `>=` is not read as `>`
const COMPARATORS: &[&str] = &[">=", "<=", ">", "<", "~", "^"];
const UNBOUNDED: &[&str] = &["*", "x", "latest"];
// Sources that carry no registry version at all
const NON_REGISTRY_PREFIXES: &[&str] = &["file:", "link:", "http://", "https://", "portal:"];

/// Parse an npm version spec into its bare version and constraint
pub fn parse_version_spec(spec: &str) -> (String, Constraint) {
    let trimmed = spec.trim();

    if let Some(vcs) = parse_vcs_reference(trimmed) {
        return match vcs.reference {
            Some(reference) => (reference, Constraint::Exact),
            None => (String::new(), Constraint::Missing),
        };
    }

    if trimmed.is_empty() {
        return (String::new(), Constraint::Missing);
    }

    if let Some(alias) = trimmed.strip_prefix("npm:") {
        // The package part may itself be scoped (`@scope/pkg@1.0`)
        return match alias.rsplit_once('@') {
            Some((package, spec)) if !package.is_empty() => parse_version_spec(spec),
            _ => (String::new(), Constraint::Missing),
        };
    }

    let lowered = trimmed.to_ascii_lowercase();
    if NON_REGISTRY_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return (String::new(), Constraint::Missing);
    }

    if UNBOUNDED.contains(&lowered.as_str()) {
        return (String::new(), Constraint::Weak(trimmed.to_string()));
    }

    for comparator in COMPARATORS {
        if let Some(rest) = trimmed.strip_prefix(comparator) {
            return (
                rest.trim().to_string(),
                Constraint::Weak(comparator.to_string()),
            );
        }
    }

    let exact = trimmed.strip_prefix('=').unwrap_or(trimmed).trim();
    (exact.to_string(), Constraint::Exact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact() {
        assert_eq!(
            parse_version_spec("4.17.21"),
            ("4.17.21".to_string(), Constraint::Exact)
        );
        assert_eq!(
            parse_version_spec("=1.0.0"),
            ("1.0.0".to_string(), Constraint::Exact)
        );
    }

    #[test]
    fn test_parse_caret() {
        assert_eq!(
            parse_version_spec("^4.17.21"),
            ("4.17.21".to_string(), Constraint::Weak("^".to_string()))
        );
    }

    #[test]
    fn test_parse_tilde() {
        assert_eq!(
            parse_version_spec("~4.18.2"),
            ("4.18.2".to_string(), Constraint::Weak("~".to_string()))
        );
    }

    #[test]
    fn test_parse_gte_before_gt() {
        assert_eq!(
            parse_version_spec(">=1.0.0"),
            ("1.0.0".to_string(), Constraint::Weak(">=".to_string()))
        );
        assert_eq!(
            parse_version_spec(">1.0.0"),
            ("1.0.0".to_string(), Constraint::Weak(">".to_string()))
        );
        assert_eq!(
            parse_version_spec("<= 2.0.0"),
            ("2.0.0".to_string(), Constraint::Weak("<=".to_string()))
        );
    }

    #[test]
    fn test_parse_unbounded() {
        assert_eq!(
            parse_version_spec("*"),
            (String::new(), Constraint::Weak("*".to_string()))
        );
        assert_eq!(
            parse_version_spec("latest"),
            (String::new(), Constraint::Weak("latest".to_string()))
        );
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_version_spec(""), (String::new(), Constraint::Missing));
    }

    #[test]
    fn test_parse_vcs() {
        assert_eq!(
            parse_version_spec("git+https://github.com/org/widget.git#v2.0.1"),
            ("v2.0.1".to_string(), Constraint::Exact)
        );
        assert_eq!(
            parse_version_spec("git://github.com/org/widget.git"),
            (String::new(), Constraint::Missing)
        );
    }

    #[test]
    fn test_parse_npm_alias() {
        assert_eq!(
            parse_version_spec("npm:lodash@4.17.21"),
            ("4.17.21".to_string(), Constraint::Exact)
        );
        assert_eq!(
            parse_version_spec("npm:@types/node@^18.0.0"),
            ("18.0.0".to_string(), Constraint::Weak("^".to_string()))
        );
        assert_eq!(
            parse_version_spec("npm:lodash"),
            (String::new(), Constraint::Missing)
        );
    }

    #[test]
    fn test_parse_non_registry_sources() {
        for spec in [
            "file:../z",
            "link:./packages/util",
            "https://example.com/x-1.0.tgz",
            "HTTP://example.com/y.tgz",
        ] {
            assert_eq!(
                parse_version_spec(spec),
                (String::new(), Constraint::Missing),
                "spec {:?}",
                spec
            );
        }
    }
}

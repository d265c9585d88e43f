//! VCS reference parser
//!
//! Handles git URLs as found in requirement files and package.json:
//! - pip: `git+https://host/org/repo.git@ref#egg=name`
//! - npm: `git+ssh://git@host/org/repo.git#ref`

use regex::Regex;
use std::sync::LazyLock;

// Package name comes from the repository path tail, never the #egg= fragment
static PIP_VCS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^git(?:\+[a-z]+)?://(?:[^/@\s]+@)?[^/\s]+(?:/[^/@#\s]+)*/([^/@#\s]+?)(?:\.git)?(?:@([^#\s]+))?#egg=[^\s]+$",
    )
    .unwrap()
});
static URL_VCS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^git(?:\+[a-z]+)?://(?:[^/@\s]+@)?[^/\s]+(?:/[^/@#\s]+)*/([^/@#\s]+?)(?:\.git)?(?:#([^\s]+))?$",
    )
    .unwrap()
});

/// A repository reference extracted from a VCS URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsReference {
    /// Repository name (last path segment, without `.git`)
    pub repository: String,
    /// Branch, tag or commit, if pinned
    pub reference: Option<String>,
}

/// Parse a VCS URL, returning None if the text is not one
pub fn parse_vcs_reference(spec: &str) -> Option<VcsReference> {
    let trimmed = spec.trim();
    let caps = PIP_VCS_RE
        .captures(trimmed)
        .or_else(|| URL_VCS_RE.captures(trimmed))?;

    Some(VcsReference {
        repository: caps.get(1)?.as_str().to_string(),
        reference: caps.get(2).map(|m| m.as_str().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pip_vcs_name_from_path_not_egg() {
        let r = parse_vcs_reference("git+https://github.com/happy/place.git@v0.1.8#egg=some-thing")
            .unwrap();
        assert_eq!(r.repository, "place");
        assert_eq!(r.reference.as_deref(), Some("v0.1.8"));
    }

    #[test]
    fn test_pip_vcs_without_ref() {
        let r = parse_vcs_reference("git+https://github.com/happy/place#egg=place").unwrap();
        assert_eq!(r.repository, "place");
        assert!(r.reference.is_none());
    }

    #[test]
    fn test_pip_vcs_ssh_user() {
        let r = parse_vcs_reference("git+ssh://git@github.com/org/tool.git@abc123#egg=tool")
            .unwrap();
        assert_eq!(r.repository, "tool");
        assert_eq!(r.reference.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_url_vcs_with_fragment_ref() {
        let r = parse_vcs_reference("git+https://github.com/org/widget.git#v2.0.1").unwrap();
        assert_eq!(r.repository, "widget");
        assert_eq!(r.reference.as_deref(), Some("v2.0.1"));
    }

    #[test]
    fn test_plain_git_scheme() {
        let r = parse_vcs_reference("git://github.com/org/widget.git").unwrap();
        assert_eq!(r.repository, "widget");
        assert!(r.reference.is_none());
    }

    #[test]
    fn test_not_vcs() {
        assert!(parse_vcs_reference("requests==2.0").is_none());
        assert!(parse_vcs_reference("^1.2.3").is_none());
        assert!(parse_vcs_reference("https://example.com/pkg.tgz").is_none());
    }
}

//! Advisory issues recorded while resolving a manifest

use serde::Serialize;
use std::fmt;

/// A human-readable advisory finding
///
/// Issues are immutable once created and order lexically, so a sorted
/// issue list is deterministic across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Issue(String);

impl Issue {
    /// The declaration carries no version at all
    pub fn missing_version(name: &str) -> Self {
        Issue(format!("{} has no declared version", name))
    }

    /// The declaration is bound by a range or comparator instead of a pin
    pub fn weak_version(name: &str, comparator: &str, version: &str) -> Self {
        Issue(format!(
            "{} has a weak version constraint '{}{}'",
            name, comparator, version
        ))
    }

    /// The declared version differs from the version actually in effect
    pub fn version_mismatch(name: &str, declared: &str, resolved: &str) -> Self {
        let declared = if declared.is_empty() {
            "<none>"
        } else {
            declared
        };
        Issue(format!(
            "{} declares version '{}' but resolves to '{}'",
            name, declared, resolved
        ))
    }

    /// A template variable is declared but never referenced
    pub fn unused_variable(key: &str, location: &str) -> Self {
        Issue(format!(
            "variable '{}' declared in {} is never used",
            key, location
        ))
    }

    /// No revision id could be found for the declaration
    pub fn unresolved_revision(name: &str) -> Self {
        Issue(format!("{} has no resolved revision in the lock file", name))
    }

    /// The build tool failed on a non-root project and an ancestor's
    /// resolution was used instead
    pub fn tool_failure(location: &str, reason: &str) -> Self {
        Issue(format!(
            "build tool failed for {} ({}); using nearest ancestor resolution",
            location, reason
        ))
    }

    /// Returns the message text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_version_quotes_comparator_and_version() {
        let issue = Issue::weak_version("kcilc", ">=", "0.6");
        assert!(issue.as_str().contains(">="));
        assert!(issue.as_str().contains("0.6"));
        assert!(issue.as_str().contains("kcilc"));
    }

    #[test]
    fn test_version_mismatch_carries_both_values() {
        let issue = Issue::version_mismatch("a/b", "1.0", "1.2.release");
        assert!(issue.as_str().contains("'1.0'"));
        assert!(issue.as_str().contains("'1.2.release'"));
    }

    #[test]
    fn test_version_mismatch_empty_declared() {
        let issue = Issue::version_mismatch("a/b", "", "2.0");
        assert!(issue.as_str().contains("<none>"));
    }

    #[test]
    fn test_missing_and_unresolved() {
        assert_eq!(
            Issue::missing_version("six").as_str(),
            "six has no declared version"
        );
        assert!(Issue::unresolved_revision("github.com/a/b")
            .as_str()
            .contains("lock file"));
    }

    #[test]
    fn test_unused_variable() {
        let issue = Issue::unused_variable("junit.version", "app/pom.xml");
        assert_eq!(
            issue.as_str(),
            "variable 'junit.version' declared in app/pom.xml is never used"
        );
    }

    #[test]
    fn test_lexical_order() {
        let mut issues = vec![Issue::missing_version("zeta"), Issue::missing_version("alpha")];
        issues.sort();
        assert!(issues[0].as_str().starts_with("alpha"));
    }

    #[test]
    fn test_serialize_as_plain_string() {
        let json = serde_json::to_string(&Issue::missing_version("six")).unwrap();
        assert_eq!(json, "\"six has no declared version\"");
    }
}

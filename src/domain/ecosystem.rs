//! Ecosystem type definitions for supported packaging conventions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported packaging ecosystems
///
/// Variants are declared in their canonical sort order; dependency
/// collections sort by ecosystem first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// No ecosystem recorded (short dependency strings)
    Unknown,
    /// Conda packages (environment.yml, meta.yaml)
    Conda,
    /// Go packages vendored with glide (glide.yaml + glide.lock)
    Go,
    /// Maven artifacts (pom.xml)
    Maven,
    /// npm packages (package.json)
    Npm,
    /// Python packages (requirements.txt, pip sections of Conda environments)
    Python,
}

impl Ecosystem {
    /// Returns the token used in the full dependency string form
    pub fn token(&self) -> &'static str {
        match self {
            Ecosystem::Unknown => "",
            Ecosystem::Conda => "conda",
            Ecosystem::Go => "go",
            Ecosystem::Maven => "maven",
            Ecosystem::Npm => "npm",
            Ecosystem::Python => "python",
        }
    }

    /// Returns the display name for this ecosystem
    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::Unknown => "Unknown",
            Ecosystem::Conda => "Conda",
            Ecosystem::Go => "Go",
            Ecosystem::Maven => "Maven",
            Ecosystem::Npm => "npm",
            Ecosystem::Python => "Python",
        }
    }

    /// Returns all concrete ecosystems
    pub fn all() -> &'static [Ecosystem] {
        &[
            Ecosystem::Conda,
            Ecosystem::Go,
            Ecosystem::Maven,
            Ecosystem::Npm,
            Ecosystem::Python,
        ]
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if lowered.is_empty() || lowered == "unknown" {
            return Ok(Ecosystem::Unknown);
        }
        Ecosystem::all()
            .iter()
            .copied()
            .find(|e| e.token() == lowered)
            .ok_or_else(|| format!("unknown ecosystem '{}'", s))
    }
}

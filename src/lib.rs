//! depaudit - Multi-ecosystem dependency declaration auditor
//!
//! This library resolves the third-party dependencies declared in project
//! manifests into one canonical, sorted list and records advisory issues
//! about the declarations:
//! - Maven (pom.xml, reconciled against `mvn dependency:resolve`)
//! - npm (package.json)
//! - Go via glide (glide.yaml + glide.lock)
//! - Python (requirements.txt)
//! - Conda (environment.yml, meta.yaml)

pub mod build_tool;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod maven;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod progress;
pub mod reader;

//! Core domain models for depaudit
//!
//! This module contains the canonical data model shared by every resolver:
//! - Ecosystem tags for supported packaging conventions
//! - Dependency records with their string forms
//! - Advisory issues
//! - Ordered collections with dedup and sort utilities

mod collections;
mod dependency;
mod ecosystem;
mod issue;

pub use collections::{Dependencies, Issues, Resolution};
pub use dependency::Dependency;
pub use ecosystem::Ecosystem;
pub use issue::Issue;

//! File-read capability shared by every resolver
//!
//! Resolvers never touch the filesystem directly; they go through a
//! [`FileReader`] so tests can serve fixtures from memory.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Reads the raw bytes behind a path
///
/// Implementations must be safe for concurrent reads, since one reader is
/// shared by every resolve running in parallel.
pub trait FileReader: Send + Sync {
    /// Read the full contents of `path`
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reader backed by the real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Reader backed by fixed in-memory fixtures
#[derive(Debug, Default, Clone)]
pub struct MemoryReader {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryReader {
    /// Create an empty reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixture (builder pattern)
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Register a fixture
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl FileReader for MemoryReader {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no fixture for {}", path.display()),
            )
        })
    }
}

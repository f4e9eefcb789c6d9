//! FileSystem abstraction used by templates

mod real;

use anyhow::Result;
use std::path::Path;

pub use real::RealFileSystem;

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// A directory entry returned by read_dir
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// Abstraction over file system operations for testability
pub trait FileSystem: Send + Sync {
    /// List the immediate entries of a directory
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Create or truncate `path` and write `contents` to it
    fn write_file(&self, path: &Path, contents: &str) -> Result<()>;
}

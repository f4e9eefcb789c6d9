use super::{DirEntry, FileSystem, FileType};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// FileSystem backed by the local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)
            .with_context(|| format!("Failed to read directory {}", path.display()))?
        {
            let entry = entry?;
            let ft = entry.file_type()?;
            let file_type = if ft.is_dir() {
                FileType::Directory
            } else if ft.is_symlink() {
                FileType::Symlink
            } else {
                FileType::File
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                file_type,
            });
        }
        Ok(entries)
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }
}

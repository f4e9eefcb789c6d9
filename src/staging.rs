//! Per-request staging directories
//!
//! Every deployment request works on its own copy of the uploaded project.
//! [`StagedProject::stage`] creates that copy, [`LocalTempManager`] removes it
//! once a template asks for cleanup.

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Project path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Project path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to stage {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk project tree: {0}")]
    Walk(#[from] walkdir::Error),
}

fn io_err(path: &Path, source: std::io::Error) -> StagingError {
    StagingError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Copy the contents of `source` into `target`. `target` itself is skipped
/// when it lives inside `source`.
fn copy_tree(source: &Path, target: &Path) -> Result<(), StagingError> {
    let source = fs::canonicalize(source).map_err(|e| io_err(source, e))?;
    let target = fs::canonicalize(target).map_err(|e| io_err(target, e))?;

    let walker = WalkDir::new(&source)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| e.path() != target.as_path());

    for entry in walker {
        let entry = entry?;
        let relative = match entry.path().strip_prefix(&source) {
            Ok(r) => r,
            Err(_) => continue,
        };
        let dest = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|e| io_err(&dest, e))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &dest).map_err(|e| io_err(&dest, e))?;
        } else {
            debug!(path = %entry.path().display(), "Skipping non-regular file");
        }
    }
    Ok(())
}

/// Removes the staged directory of a finished request
#[async_trait]
pub trait TempManager: Send + Sync {
    async fn clean_temp(&self) -> Result<()>;
}

/// A project copied into a fresh directory for one request
#[derive(Debug, Clone)]
pub struct StagedProject {
    path: PathBuf,
}

impl StagedProject {
    /// Wrap a directory the caller has already populated
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Copy `source` into a new directory under `staging_root`
    pub fn stage(source: &Path, staging_root: &Path) -> Result<Self, StagingError> {
        if !source.exists() {
            return Err(StagingError::PathNotFound(source.to_path_buf()));
        }
        if !source.is_dir() {
            return Err(StagingError::NotADirectory(source.to_path_buf()));
        }

        let project = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        let short_id = uuid::Uuid::new_v4().simple().to_string();
        let target = staging_root.join(format!("jarbox-{}-{}", &short_id[..8], project));

        fs::create_dir_all(&target).map_err(|e| io_err(&target, e))?;

        if let Err(e) = copy_tree(source, &target) {
            if let Err(cleanup) = fs::remove_dir_all(&target) {
                warn!(dir = %target.display(), error = %cleanup, "Failed to remove partial staging copy");
            }
            return Err(e);
        }

        debug!(source = %source.display(), staged = %target.display(), "Project staged");
        Ok(Self { path: target })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn temp_manager(&self) -> LocalTempManager {
        LocalTempManager::new(self.path.clone())
    }
}

/// Deletes a single staged directory from the local disk
#[derive(Debug, Clone)]
pub struct LocalTempManager {
    dir: PathBuf,
}

impl LocalTempManager {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl TempManager for LocalTempManager {
    async fn clean_temp(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {
                debug!(dir = %self.dir.display(), "Removed staged directory");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                // Best effort: a leftover directory is not worth failing a deployment
                warn!(dir = %self.dir.display(), error = %e, "Failed to remove staged directory");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stage_copies_tree() {
        let source = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        fs::write(source.path().join("app.jar"), b"jar").unwrap();
        fs::create_dir(source.path().join("lib")).unwrap();
        fs::write(source.path().join("lib/dep.jar"), b"dep").unwrap();

        let staged = StagedProject::stage(source.path(), root.path()).unwrap();

        assert!(staged.path().starts_with(root.path()));
        assert_eq!(fs::read(staged.path().join("app.jar")).unwrap(), b"jar");
        assert_eq!(fs::read(staged.path().join("lib/dep.jar")).unwrap(), b"dep");
    }

    #[test]
    fn test_stage_into_own_subdirectory() {
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("app.jar"), b"jar").unwrap();
        let root = source.path().join("staging");
        fs::create_dir(&root).unwrap();

        let staged = StagedProject::stage(source.path(), &root).unwrap();

        assert_eq!(fs::read(staged.path().join("app.jar")).unwrap(), b"jar");
        // The staging root is copied as an empty directory, never the copy itself
        let nested: Vec<_> = fs::read_dir(staged.path().join("staging"))
            .unwrap()
            .collect();
        assert!(nested.is_empty());
    }

    #[test]
    fn test_stage_into_source_root() {
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("app.jar"), b"jar").unwrap();

        let staged = StagedProject::stage(source.path(), source.path()).unwrap();

        assert!(staged.path().join("app.jar").is_file());
        let copies = fs::read_dir(staged.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().is_dir())
            .count();
        assert_eq!(copies, 0);
    }

    #[test]
    #[cfg(unix)]
    fn test_failed_copy_removes_partial_target() {
        use std::os::unix::fs::PermissionsExt;

        let source = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let secret = source.path().join("secret.jar");
        fs::write(&secret, b"jar").unwrap();
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

        let unreadable = fs::File::open(&secret).is_err();
        let result = StagedProject::stage(source.path(), root.path());
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();

        // Running as root bypasses permissions; only assert when reads really fail
        if unreadable {
            assert!(matches!(result, Err(StagingError::Io { .. })));
            assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
        }
    }

    #[test]
    fn test_stage_missing_source() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("missing");

        match StagedProject::stage(&missing, root.path()) {
            Err(StagingError::PathNotFound(p)) => assert_eq!(p, missing),
            other => panic!("Expected PathNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_stage_file_is_rejected() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("app.jar");
        fs::write(&file, b"jar").unwrap();

        assert!(matches!(
            StagedProject::stage(&file, root.path()),
            Err(StagingError::NotADirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_clean_temp_removes_directory() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("staged");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("app.jar"), b"jar").unwrap();

        let manager = LocalTempManager::new(dir.clone());
        manager.clean_temp().await.unwrap();
        assert!(!dir.exists());

        // Second call on a missing directory is fine
        manager.clean_temp().await.unwrap();
    }
}

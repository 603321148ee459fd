use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {path}: {message}")]
    OutputDir { path: PathBuf, message: String },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A directory that has been created and found writable.
///
/// Writes go through a sibling temp file that is renamed over the target,
/// so readers never observe a half-written file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDir {
    path: PathBuf,
}

impl OutputDir {
    /// Creates `path` and its parents when missing, then checks it accepts new files.
    pub fn prepare(path: &Path) -> Result<Self, PersistError> {
        let dir_error = |message: String| PersistError::OutputDir {
            path: path.to_path_buf(),
            message,
        };
        match fs::metadata(path) {
            Ok(meta) if !meta.is_dir() => return Err(dir_error("path is not a directory".into())),
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(path).map_err(|e| dir_error(e.to_string()))?;
            }
            Err(err) => return Err(dir_error(err.to_string())),
        }
        NamedTempFile::new_in(path).map_err(|e| dir_error(e.to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `{dir}/{filename}`, replacing any existing file of that name.
    pub fn write(&self, filename: &str, content: impl AsRef<[u8]>) -> Result<PathBuf, PersistError> {
        let target = self.path.join(filename);
        let write_error = |source: io::Error| PersistError::Write {
            path: target.clone(),
            source,
        };
        let mut staged = NamedTempFile::new_in(&self.path).map_err(write_error)?;
        staged.write_all(content.as_ref()).map_err(write_error)?;
        staged.as_file_mut().sync_all().map_err(write_error)?;
        staged.persist(&target).map_err(|e| write_error(e.error))?;
        Ok(target)
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically.
pub fn absolute_path(path: &Path) -> Result<PathBuf, PersistError> {
    let absolute = std::path::absolute(path).map_err(|err| PersistError::OutputDir {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    Ok(normalize_path(&absolute))
}

/// Drops `.` components and folds each `..` into its parent without
/// touching the filesystem. `..` above the root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

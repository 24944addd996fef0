use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("directory missing or not writable: {0}")]
    Directory(String),
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure a directory exists; create if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::Directory(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::Directory(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::Directory(e.to_string()))?;
    }
    Ok(())
}

/// Atomically write a file by writing a sibling temp file then renaming.
pub struct AtomicFileWriter {
    target: PathBuf,
    overwrite: bool,
    private: bool,
}

impl AtomicFileWriter {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            overwrite: true,
            private: false,
        }
    }

    /// Refuse to replace an existing file.
    pub fn no_overwrite(mut self) -> Self {
        self.overwrite = false;
        self
    }

    /// Restrict the file to its owner (unix only), for key material.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn write(&self, content: &[u8]) -> Result<PathBuf, PersistError> {
        if !self.overwrite && self.target.exists() {
            return Err(PersistError::AlreadyExists(self.target.clone()));
        }
        let tmp = self.stage(content)?;
        self.commit(tmp)
    }

    /// Writes `content` to a synced temp file next to the target.
    fn stage(&self, content: &[u8]) -> Result<NamedTempFile, PersistError> {
        let dir = match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        ensure_dir(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        if self.private {
            restrict_to_owner(tmp.path())?;
        }
        Ok(tmp)
    }

    /// Renames the temp file into place; without overwrite a file that
    /// appeared in the meantime is left untouched.
    fn commit(&self, tmp: NamedTempFile) -> Result<PathBuf, PersistError> {
        let persisted = if self.overwrite {
            tmp.persist(&self.target)
        } else {
            tmp.persist_noclobber(&self.target)
        };
        match persisted {
            Ok(_) => Ok(self.target.clone()),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(PersistError::AlreadyExists(self.target.clone()))
            }
            Err(err) => Err(PersistError::Io(err.error)),
        }
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_replaces_existing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let target = temp.path().join("portal.ron");
        fs::write(&target, "old").unwrap();

        AtomicFileWriter::new(&target).write(b"new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn no_overwrite_refuses_existing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let target = temp.path().join("keypair.json");
        fs::write(&target, "old").unwrap();

        let err = AtomicFileWriter::new(&target)
            .no_overwrite()
            .write(b"new")
            .unwrap_err();
        assert!(matches!(err, PersistError::AlreadyExists(path) if path == target));
        assert_eq!(fs::read_to_string(&target).unwrap(), "old");
    }

    #[test]
    fn no_overwrite_keeps_file_created_after_staging() {
        let temp = tempfile::TempDir::new().unwrap();
        let target = temp.path().join("keypair.json");
        let writer = AtomicFileWriter::new(&target).no_overwrite();

        let staged = writer.stage(b"ours").unwrap();
        fs::write(&target, "theirs").unwrap();

        assert!(matches!(
            writer.commit(staged),
            Err(PersistError::AlreadyExists(_))
        ));
        assert_eq!(fs::read_to_string(&target).unwrap(), "theirs");
    }
}

//! Atomic file replacement via the `.lock` protocol.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{LockError, UtilError};
use crate::Result;

const LOCK_SUFFIX: &str = ".lock";

/// RAII guard for writing a file atomically.
///
/// Creates `<path>.lock` with O_CREAT|O_EXCL on acquisition, buffers all
/// writes there, then renames it over the target on [`commit`](LockFile::commit).
/// The lock file is fsynced before the rename so a committed write is durable.
/// Dropping without committing removes the lock file and leaves the target
/// untouched.
pub struct LockFile {
    path: PathBuf,
    lock_path: PathBuf,
    file: Option<File>,
    committed: bool,
}

impl LockFile {
    /// Acquire the lock for `path`. Fails if another writer holds it.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock_path = PathBuf::from(format!("{}{}", path.display(), LOCK_SUFFIX));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    UtilError::Lock(LockError::AlreadyLocked {
                        path: lock_path.clone(),
                    })
                } else {
                    UtilError::Lock(LockError::Create {
                        path: lock_path.clone(),
                        source: e,
                    })
                }
            })?;

        Ok(Self {
            path,
            lock_path,
            file: Some(file),
            committed: false,
        })
    }

    /// The target path (without `.lock`).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The lock file path (with `.lock`).
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Flush, fsync, and atomically rename the lock file over the target.
    pub fn commit(mut self) -> Result<()> {
        let commit_err = |path: &Path, e: io::Error| {
            UtilError::Lock(LockError::Commit {
                path: path.to_path_buf(),
                source: e,
            })
        };

        if let Some(ref mut file) = self.file {
            file.flush().map_err(|e| commit_err(&self.lock_path, e))?;
            file.sync_all().map_err(|e| commit_err(&self.lock_path, e))?;
        }
        self.file.take();

        fs::rename(&self.lock_path, &self.path)
            .map_err(|e| commit_err(&self.lock_path, e))?;

        self.committed = true;
        Ok(())
    }

    /// Abandon the write, removing the lock file.
    pub fn rollback(mut self) -> Result<()> {
        self.file.take();
        if self.lock_path.exists() {
            fs::remove_file(&self.lock_path)?;
        }
        self.committed = true;
        Ok(())
    }
}

impl Write for LockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("lock file already closed"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("lock file already closed"))?
            .flush()
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if !self.committed {
            self.file.take();
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_commit() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        fs::write(&target, b"old content").unwrap();

        let mut lock = LockFile::acquire(&target).unwrap();
        assert!(lock.lock_path().exists());
        lock.write_all(b"new content").unwrap();
        lock.commit().unwrap();

        assert!(!dir.path().join("target.txt.lock").exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "new content");
    }

    #[test]
    fn rollback_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        fs::write(&target, b"original").unwrap();

        let mut lock = LockFile::acquire(&target).unwrap();
        lock.write_all(b"should not persist").unwrap();
        lock.rollback().unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "original");
        assert!(!dir.path().join("target.txt.lock").exists());
    }

    #[test]
    fn drop_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        fs::write(&target, b"original").unwrap();

        {
            let mut lock = LockFile::acquire(&target).unwrap();
            lock.write_all(b"dropped").unwrap();
        }

        assert!(!dir.path().join("target.txt.lock").exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "original");
    }

    #[test]
    fn double_lock_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");

        let _held = LockFile::acquire(&target).unwrap();
        match LockFile::acquire(&target) {
            Err(UtilError::Lock(LockError::AlreadyLocked { .. })) => {}
            Err(e) => panic!("expected AlreadyLocked, got error: {e}"),
            Ok(_) => panic!("expected AlreadyLocked, got Ok"),
        }
    }

    #[test]
    fn creates_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fresh.txt");

        let mut lock = LockFile::acquire(&target).unwrap();
        lock.write_all(b"created via lock").unwrap();
        lock.commit().unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "created via lock");
    }
}

//! Repository discovery: walking up from a starting directory.

use std::path::{Path, PathBuf};

use crate::RepoError;

/// The outcome of discovery, before subsystems are wired up.
#[derive(Debug)]
pub struct DiscoveredRepo {
    pub git_dir: PathBuf,
    pub work_dir: Option<PathBuf>,
}

/// Does this directory look like a git directory?
///
/// The predicate is the presence of `HEAD`, `objects/`, and `refs/`.
pub fn is_git_dir(path: &Path) -> bool {
    path.join("HEAD").is_file() && path.join("objects").is_dir() && path.join("refs").is_dir()
}

/// Walk up parent directories from `start` until a git directory is found.
///
/// `<p>/.git` marks a normal repository with work tree `<p>`; a directory
/// that is itself a git directory is a bare repository. Reaching the
/// filesystem root without a hit fails with `NotARepository`.
pub fn discover(start: &Path) -> Result<DiscoveredRepo, RepoError> {
    let start = std::fs::canonicalize(start)
        .map_err(|_| RepoError::NotARepository(start.to_path_buf()))?;

    let mut current = start.clone();
    loop {
        let dot_git = current.join(".git");
        if is_git_dir(&dot_git) {
            return Ok(DiscoveredRepo {
                git_dir: dot_git,
                work_dir: Some(current),
            });
        }

        if is_git_dir(&current) {
            return Ok(DiscoveredRepo {
                git_dir: current,
                work_dir: None,
            });
        }

        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => return Err(RepoError::NotARepository(start)),
        }
    }
}

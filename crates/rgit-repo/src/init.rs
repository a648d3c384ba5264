//! Repository initialization.

use std::fs;
use std::path::Path;

use crate::discover::DiscoveredRepo;
use crate::{Config, RepoError};

const DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

/// Create the on-disk skeleton of a repository.
///
/// The git directory is `<path>/.git` for a normal repository or `<path>`
/// itself when `bare`. Creates `hooks/`, `info/`, `objects/`,
/// `refs/heads/`, `refs/tags/`, the `description` file, `HEAD` pointing at
/// `refs/heads/master`, and the `[core]` config defaults.
pub fn init_repository(path: &Path, bare: bool) -> Result<DiscoveredRepo, RepoError> {
    let (git_dir, work_dir) = if bare {
        (path.to_path_buf(), None)
    } else {
        (path.join(".git"), Some(path.to_path_buf()))
    };

    // Re-running init on an existing repository is a safe no-op; existing
    // data is never overwritten.
    if git_dir.join("HEAD").is_file() {
        return Ok(DiscoveredRepo { git_dir, work_dir });
    }

    for dir in ["hooks", "info", "objects", "refs/heads", "refs/tags"] {
        fs::create_dir_all(git_dir.join(dir))?;
    }

    fs::write(git_dir.join("description"), DESCRIPTION)?;
    fs::write(git_dir.join("HEAD"), "ref: refs/heads/master\n")?;

    let mut config = Config::open(git_dir.join("config"))?;
    config.set("core", "repositoryformatversion", "0")?;
    config.set("core", "filemode", "false")?;
    config.set("core", "symlinks", "false")?;
    config.set("core", "ignorecase", "true")?;
    config.set("core", "bare", if bare { "true" } else { "false" })?;

    Ok(DiscoveredRepo { git_dir, work_dir })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_expected_layout() {
        let dir = tempfile::tempdir().unwrap();
        init_repository(dir.path(), false).unwrap();

        let git_dir = dir.path().join(".git");
        for sub in ["hooks", "info", "objects", "refs/heads", "refs/tags"] {
            assert!(git_dir.join(sub).is_dir(), "{sub} missing");
        }
        assert!(git_dir.join("description").is_file());
        assert_eq!(
            fs::read_to_string(git_dir.join("HEAD")).unwrap(),
            "ref: refs/heads/master\n"
        );
    }

    #[test]
    fn bare_layout_lives_at_root() {
        let dir = tempfile::tempdir().unwrap();
        let discovered = init_repository(dir.path(), true).unwrap();

        assert_eq!(discovered.git_dir, dir.path());
        assert!(discovered.work_dir.is_none());
        assert!(dir.path().join("refs/heads").is_dir());
    }

    #[test]
    fn reinit_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        init_repository(dir.path(), false).unwrap();

        let head = dir.path().join(".git/HEAD");
        fs::write(&head, "ref: refs/heads/other\n").unwrap();

        init_repository(dir.path(), false).unwrap();
        assert_eq!(fs::read_to_string(&head).unwrap(), "ref: refs/heads/other\n");
    }

    #[test]
    fn config_defaults_written() {
        let dir = tempfile::tempdir().unwrap();
        init_repository(dir.path(), false).unwrap();

        let config = Config::open(dir.path().join(".git/config")).unwrap();
        assert_eq!(config.get("core", "repositoryformatversion"), Some("0"));
        assert_eq!(config.get("core", "filemode"), Some("false"));
        assert_eq!(config.get("core", "symlinks"), Some("false"));
        assert_eq!(config.get("core", "ignorecase"), Some("true"));
        assert_eq!(config.get("core", "bare"), Some("false"));
    }
}

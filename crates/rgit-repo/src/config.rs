//! Repository configuration: the INI-style `<gitdir>/config` file.
//!
//! Only the repo-local file is handled here; system and global config
//! discovery belongs to the host.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use rgit_utils::date::Signature;
use rgit_utils::LockFile;

use crate::RepoError;

/// Parsed `[section] key = value` configuration bound to a file.
pub struct Config {
    path: PathBuf,
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Config {
    /// Open the config file at `path`, parsing it if it exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let path = path.as_ref().to_path_buf();
        let mut config = Self {
            path: path.clone(),
            sections: BTreeMap::new(),
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(config),
            Err(e) => return Err(RepoError::Io(e)),
        };

        let mut section = String::new();
        for (i, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = name.trim().to_string();
                config.sections.entry(section.clone()).or_default();
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(RepoError::ConfigParse {
                    path,
                    line: i + 1,
                });
            };
            config
                .sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_string(), value.trim().to_string());
        }

        Ok(config)
    }

    /// Look up a value.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|kv| kv.get(key))
            .map(String::as_str)
    }

    /// Set a value and rewrite the file.
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> Result<(), RepoError> {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.write()
    }

    /// The `user.name` / `user.email` identity stamped at the current time.
    pub fn identity(&self) -> Signature {
        let name = self.get("user", "name").unwrap_or("unknown");
        let email = self.get("user", "email").unwrap_or("unknown");
        Signature::now(name, email)
    }

    fn write(&self) -> Result<(), RepoError> {
        let mut lock = LockFile::acquire(&self.path)?;
        for (section, kv) in &self.sections {
            writeln!(lock, "[{section}]")?;
            for (key, value) in kv {
                writeln!(lock, "\t{key} = {value}")?;
            }
        }
        lock.commit()?;
        Ok(())
    }
}

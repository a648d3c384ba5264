use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rgit_hash::ObjectId;
use rgit_utils::LockFile;

use crate::{RefError, RefName, Reference, SYMREF_PREFIX};

/// Symbolic chains longer than this are treated as cycles.
const MAX_SYMREF_DEPTH: usize = 10;

/// Directories searched by [`RefStore::find`], in order. The empty entry is
/// the git directory root, where `HEAD` and friends live.
const SCAN_DIRS: &[&str] = &["", "refs", "refs/heads", "refs/tags", "refs/remotes"];

/// File-backed reference storage under a git directory.
pub struct RefStore {
    git_dir: PathBuf,
}

impl RefStore {
    pub fn new(git_dir: impl AsRef<Path>) -> Self {
        Self {
            git_dir: git_dir.as_ref().to_path_buf(),
        }
    }

    /// The git directory this store operates on.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn ref_path(&self, name: &RefName) -> PathBuf {
        self.git_dir.join(name.as_str())
    }

    /// Write a ref. A value starting with `ref: ` produces a symbolic ref,
    /// anything else must be a 40-char OID. Parent directories are created;
    /// the write is atomic.
    pub fn set(&self, name: &str, value: &str) -> Result<Reference, RefError> {
        let name = RefName::new(name)?;
        let reference = match value.strip_prefix(SYMREF_PREFIX) {
            Some(target) => Reference::Symbolic {
                name: name.clone(),
                target: RefName::new(target.trim())?,
            },
            None => Reference::Hash {
                name: name.clone(),
                target: ObjectId::from_hex(value.trim())?,
            },
        };
        self.write_ref(&reference)?;
        Ok(reference)
    }

    /// Write a hash ref.
    pub fn set_oid(&self, name: &str, target: ObjectId) -> Result<Reference, RefError> {
        let reference = Reference::Hash {
            name: RefName::new(name)?,
            target,
        };
        self.write_ref(&reference)?;
        Ok(reference)
    }

    /// Write a symbolic ref.
    pub fn set_symbolic(&self, name: &str, target: &str) -> Result<Reference, RefError> {
        let reference = Reference::Symbolic {
            name: RefName::new(name)?,
            target: RefName::new(target)?,
        };
        self.write_ref(&reference)?;
        Ok(reference)
    }

    fn write_ref(&self, reference: &Reference) -> Result<(), RefError> {
        let path = self.ref_path(reference.name());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RefError::IoPath {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut lock = LockFile::acquire(&path)?;
        let content = format!("{}\n", reference.stored_value());
        lock.write_all(content.as_bytes())
            .map_err(|e| RefError::IoPath {
                path: path.clone(),
                source: e,
            })?;
        lock.commit()?;
        Ok(())
    }

    /// Load and parse a ref file.
    pub fn get(&self, name: &str) -> Result<Reference, RefError> {
        let name = RefName::new(name)?;
        self.get_ref(&name)
    }

    fn get_ref(&self, name: &RefName) -> Result<Reference, RefError> {
        let path = self.ref_path(name);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RefError::NotFound(name.to_string()))
            }
            Err(e) => {
                return Err(RefError::IoPath {
                    path: path.clone(),
                    source: e,
                })
            }
        };

        let trimmed = contents.trim();
        match trimmed.strip_prefix(SYMREF_PREFIX) {
            Some(target) => Ok(Reference::Symbolic {
                name: name.clone(),
                target: RefName::new(target.trim())?,
            }),
            None => Ok(Reference::Hash {
                name: name.clone(),
                target: ObjectId::from_hex(trimmed)
                    .map_err(|_| RefError::Parse(format!("'{name}': not an OID")))?,
            }),
        }
    }

    /// Does a ref with this name exist?
    pub fn exists(&self, name: &str) -> bool {
        RefName::new(name)
            .map(|n| self.ref_path(&n).is_file())
            .unwrap_or(false)
    }

    /// Enumerate the refs whose directory matches `prefix` — a non-recursive
    /// scan of `<gitdir>/<prefix>`. Results are sorted by name.
    pub fn list(&self, prefix: &str) -> Result<Vec<Reference>, RefError> {
        let rel = prefix.trim_matches('/');
        let dir = if rel.is_empty() {
            self.git_dir.clone()
        } else {
            self.git_dir.join(rel)
        };

        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RefError::IoPath {
                    path: dir,
                    source: e,
                })
            }
        };

        let mut refs = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if file_name.ends_with(".lock") {
                continue;
            }

            let full = if rel.is_empty() {
                file_name.to_string()
            } else {
                format!("{rel}/{file_name}")
            };
            let Ok(name) = RefName::new(full) else {
                continue;
            };
            // Unparsable files are skipped rather than failing the listing.
            if let Ok(reference) = self.get_ref(&name) {
                refs.push(reference);
            }
        }

        refs.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(refs)
    }

    /// Remove a ref file.
    pub fn delete(&self, name: &str) -> Result<(), RefError> {
        let name = RefName::new(name)?;
        let path = self.ref_path(&name);
        if !path.is_file() {
            return Err(RefError::NotFound(name.to_string()));
        }
        fs::remove_file(&path).map_err(|e| RefError::IoPath { path, source: e })?;
        Ok(())
    }

    /// Search the scan directories in order for `shortname` and return the
    /// first hit.
    pub fn find(&self, shortname: &str) -> Result<Reference, RefError> {
        for dir in SCAN_DIRS {
            let full = if dir.is_empty() {
                shortname.to_string()
            } else {
                format!("{dir}/{shortname}")
            };
            let Ok(name) = RefName::new(full) else {
                continue;
            };
            if self.ref_path(&name).is_file() {
                return self.get_ref(&name);
            }
        }
        Err(RefError::NotFound(shortname.to_string()))
    }

    /// Follow symbolic refs until a hash ref is reached.
    pub fn resolve(&self, reference: &Reference) -> Result<Reference, RefError> {
        let mut current = reference.clone();
        for _ in 0..MAX_SYMREF_DEPTH {
            match current {
                Reference::Hash { .. } => return Ok(current),
                Reference::Symbolic { ref target, .. } => {
                    current = self.get_ref(target)?;
                }
            }
        }
        Err(RefError::SymrefLoop(reference.name().to_string()))
    }

    /// Load a ref by name and resolve it to a hash ref.
    pub fn resolve_name(&self, name: &str) -> Result<Reference, RefError> {
        let reference = self.get(name)?;
        self.resolve(&reference)
    }
}

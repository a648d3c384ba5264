//! Branch policy over the ref store, bound to `refs/heads/`.

use rgit_hash::ObjectId;
use rgit_ref::{RefError, RefStore, Reference};

use crate::RepoError;

const PREFIX: &str = "refs/heads/";

/// Branch operations.
pub struct Branches<'a> {
    refs: &'a RefStore,
}

impl<'a> Branches<'a> {
    pub(crate) fn new(refs: &'a RefStore) -> Self {
        Self { refs }
    }

    fn full_name(name: &str) -> Result<String, RepoError> {
        if name.is_empty() {
            return Err(RepoError::EmptyBranchName);
        }
        Ok(format!("{PREFIX}{name}"))
    }

    /// Create (or reset) a branch pointing at `target`.
    pub fn create(&self, name: &str, target: ObjectId) -> Result<Reference, RepoError> {
        Ok(self.refs.set_oid(&Self::full_name(name)?, target)?)
    }

    /// Load a branch ref.
    pub fn get(&self, name: &str) -> Result<Reference, RepoError> {
        Ok(self.refs.get(&Self::full_name(name)?)?)
    }

    /// Does the branch exist?
    pub fn exists(&self, name: &str) -> bool {
        Self::full_name(name)
            .map(|full| self.refs.exists(&full))
            .unwrap_or(false)
    }

    /// All branches, sorted by name.
    pub fn list(&self) -> Result<Vec<Reference>, RepoError> {
        Ok(self.refs.list(PREFIX)?)
    }

    /// Reset an existing branch to a new target.
    pub fn update(&self, name: &str, target: ObjectId) -> Result<(), RepoError> {
        let full = Self::full_name(name)?;
        if !self.refs.exists(&full) {
            return Err(RepoError::Ref(RefError::NotFound(full)));
        }
        self.refs.set_oid(&full, target)?;
        Ok(())
    }

    /// Delete a branch.
    pub fn delete(&self, name: &str) -> Result<(), RepoError> {
        Ok(self.refs.delete(&Self::full_name(name)?)?)
    }

    /// Copy a branch. Refuses if the target already exists.
    pub fn copy(&self, from: &str, to: &str) -> Result<Reference, RepoError> {
        let to_full = Self::full_name(to)?;
        if self.refs.exists(&to_full) {
            return Err(RepoError::BranchAlreadyExists(to.to_string()));
        }

        let source = self.get(from)?;
        let target = source
            .target_oid()
            .ok_or_else(|| RepoError::Ref(RefError::NotFound(from.to_string())))?;
        Ok(self.refs.set_oid(&to_full, target)?)
    }

    /// Rename a branch: copy, then delete the source.
    pub fn rename(&self, from: &str, to: &str) -> Result<Reference, RepoError> {
        let copied = self.copy(from, to)?;
        self.delete(from)?;
        Ok(copied)
    }
}

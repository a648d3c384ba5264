//! Tag policy over the ref store and object store, bound to `refs/tags/`.

use bstr::BString;
use rgit_hash::ObjectId;
use rgit_object::{Object, Tag};
use rgit_ref::{RefStore, Reference};
use rgit_store::{ObjectStore, StoreError};
use rgit_utils::date::Signature;

use crate::RepoError;

const PREFIX: &str = "refs/tags/";

/// Tag operations.
pub struct Tags<'a> {
    refs: &'a RefStore,
    store: &'a ObjectStore,
}

impl<'a> Tags<'a> {
    pub(crate) fn new(refs: &'a RefStore, store: &'a ObjectStore) -> Self {
        Self { refs, store }
    }

    fn full_name(name: &str) -> Result<String, RepoError> {
        if name.is_empty() {
            return Err(RepoError::EmptyTagName);
        }
        Ok(format!("{PREFIX}{name}"))
    }

    fn check_absent(&self, name: &str, full: &str, force: bool) -> Result<(), RepoError> {
        if !force && self.refs.exists(full) {
            return Err(RepoError::TagAlreadyExists(name.to_string()));
        }
        Ok(())
    }

    /// Create a lightweight tag: a hash ref pointing straight at `target`.
    pub fn create_lightweight(
        &self,
        name: &str,
        target: ObjectId,
        force: bool,
    ) -> Result<Reference, RepoError> {
        let full = Self::full_name(name)?;
        self.check_absent(name, &full, force)?;
        Ok(self.refs.set_oid(&full, target)?)
    }

    /// Create an annotated tag.
    ///
    /// The target must exist in the object store; its kind is detected from
    /// its header. The tag ref is written first and rolled back if storing
    /// the tag object fails, so a dangling ref can never survive.
    pub fn create_annotated(
        &self,
        name: &str,
        target: ObjectId,
        tagger: Signature,
        message: &str,
        force: bool,
    ) -> Result<Tag, RepoError> {
        let full = Self::full_name(name)?;
        self.check_absent(name, &full, force)?;

        let target_type = match self.store.read_header(&target) {
            Ok((obj_type, _)) => obj_type,
            Err(StoreError::NotFound(_)) => return Err(RepoError::InvalidTagTarget(target)),
            Err(e) => return Err(e.into()),
        };

        let tag = Tag {
            target,
            target_type,
            name: BString::from(name),
            tagger,
            message: BString::from(message.trim_end_matches('\n')),
        };

        let tag_ref = self.refs.set_oid(&full, tag.compute_oid())?;
        if let Err(e) = self.store.put(&Object::Tag(tag.clone())) {
            let _ = self.refs.delete(tag_ref.name().as_str());
            return Err(e.into());
        }

        Ok(tag)
    }

    /// Load a tag ref.
    pub fn get(&self, name: &str) -> Result<Reference, RepoError> {
        Ok(self.refs.get(&Self::full_name(name)?)?)
    }

    /// All tag refs, sorted by name.
    pub fn list(&self) -> Result<Vec<Reference>, RepoError> {
        Ok(self.refs.list(PREFIX)?)
    }

    /// Delete a tag.
    pub fn delete(&self, name: &str) -> Result<(), RepoError> {
        Ok(self.refs.delete(&Self::full_name(name)?)?)
    }
}

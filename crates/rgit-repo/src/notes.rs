//! Notes: annotations attached to commits without touching them.
//!
//! A notes namespace is an independent commit chain under
//! `refs/notes/<namespace>` whose tree maps the annotated commit's OID (as
//! the entry name) to a blob holding the note text.

use bstr::{BString, ByteVec};
use rgit_hash::ObjectId;
use rgit_object::{Commit, CommitBuilder, FileMode, Object, ObjectType, Tree, TreeBuilder};
use rgit_ref::{RefError, RefStore};
use rgit_store::{ObjectStore, StoreError};

use crate::{Config, RepoError};

/// The namespace used when none is given.
pub const DEFAULT_NOTES_NAMESPACE: &str = "commits";

const NOTES_COMMIT_MESSAGE: &str = "Notes added by 'git notes add'";

/// A note handle: which commit it annotates and where its text lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// The annotated commit.
    pub target: ObjectId,
    /// The blob holding the note text.
    pub blob: ObjectId,
}

impl Note {
    /// Load the note text.
    pub fn message(&self, store: &ObjectStore) -> Result<BString, RepoError> {
        match store.read(&self.blob)? {
            Object::Blob(blob) => Ok(BString::from(blob.data)),
            _ => Err(RepoError::NoteNotFound(self.target)),
        }
    }
}

/// Notes operations for one namespace.
pub struct Notes<'a> {
    refs: &'a RefStore,
    store: &'a ObjectStore,
    config: &'a Config,
    note_ref: String,
}

impl<'a> Notes<'a> {
    pub(crate) fn new(
        refs: &'a RefStore,
        store: &'a ObjectStore,
        config: &'a Config,
        namespace: &str,
    ) -> Self {
        Self {
            refs,
            store,
            config,
            note_ref: format!("refs/notes/{namespace}"),
        }
    }

    /// Attach a note to `target`.
    ///
    /// Refuses to overwrite an existing note unless `force` is set.
    pub fn create(
        &self,
        target: ObjectId,
        message: &str,
        force: bool,
    ) -> Result<Note, RepoError> {
        match self.store.read_header(&target) {
            Ok((ObjectType::Commit, _)) => {}
            Ok(_) => return Err(RepoError::NotesOnNonCommit(target)),
            Err(StoreError::NotFound(_)) => return Err(RepoError::NotesOnNonCommit(target)),
            Err(e) => return Err(e.into()),
        }

        let old_head = self.head()?;
        let mut builder = TreeBuilder::new();

        if old_head.is_some() {
            for entry in self.head_tree()?.iter() {
                if entry.name == target.to_hex().as_bytes() {
                    if !force {
                        return Err(RepoError::NoteAlreadyExists(target));
                    }
                    continue;
                }
                builder.add_blob(entry.oid, entry.name.clone(), entry.mode);
            }
        }

        let blob = self.store.put_raw(ObjectType::Blob, message.as_bytes())?;
        builder.add_blob(blob, target.to_hex(), FileMode::Regular);

        self.commit_tree(builder, old_head)?;
        Ok(Note { target, blob })
    }

    /// Append to an existing note, separated by a blank line.
    pub fn append(&self, target: ObjectId, message: &str) -> Result<Note, RepoError> {
        let old_head = match self.head()? {
            Some(head) => head,
            None => return Err(RepoError::NoteNotFound(target)),
        };

        let mut builder = TreeBuilder::new();
        let mut existing: Option<ObjectId> = None;
        for entry in self.head_tree()?.iter() {
            if entry.name == target.to_hex().as_bytes() {
                existing = Some(entry.oid);
                continue;
            }
            builder.add_blob(entry.oid, entry.name.clone(), entry.mode);
        }
        let existing = existing.ok_or(RepoError::NoteNotFound(target))?;

        let mut text = match self.store.read(&existing)? {
            Object::Blob(blob) => BString::from(blob.data),
            _ => return Err(RepoError::NoteNotFound(target)),
        };
        text.push_str("\n\n");
        text.push_str(message.as_bytes());

        let blob = self.store.put_raw(ObjectType::Blob, &text)?;
        builder.add_blob(blob, target.to_hex(), FileMode::Regular);

        self.commit_tree(builder, Some(old_head))?;
        Ok(Note { target, blob })
    }

    /// Copy the note on `from` onto `to`.
    pub fn copy(&self, from: ObjectId, to: ObjectId, force: bool) -> Result<Note, RepoError> {
        let source = self
            .find(from)?
            .ok_or(RepoError::NoteNotFound(from))?;
        let message = source.message(self.store)?;
        self.create(to, &String::from_utf8_lossy(&message), force)
    }

    /// Remove the note on `target`. A no-op when the notes ref does not
    /// exist.
    pub fn remove(&self, target: ObjectId) -> Result<(), RepoError> {
        let old_head = match self.head()? {
            Some(head) => head,
            None => return Ok(()),
        };

        let mut builder = TreeBuilder::new();
        let mut found = false;
        for entry in self.head_tree()?.iter() {
            if entry.name == target.to_hex().as_bytes() {
                found = true;
                continue;
            }
            builder.add_blob(entry.oid, entry.name.clone(), entry.mode);
        }
        if !found {
            return Err(RepoError::NoteNotFound(target));
        }

        self.commit_tree(builder, Some(old_head))?;
        Ok(())
    }

    /// Enumerate notes, optionally restricted to one target.
    pub fn list(&self, filter: Option<ObjectId>) -> Result<Vec<Note>, RepoError> {
        if self.head()?.is_none() {
            return Ok(Vec::new());
        }

        let mut notes = Vec::new();
        for entry in self.head_tree()?.iter() {
            let Ok(target) = ObjectId::from_hex(&entry.name.to_string()) else {
                continue;
            };
            if let Some(wanted) = filter {
                if wanted != target {
                    continue;
                }
            }
            notes.push(Note {
                target,
                blob: entry.oid,
            });
        }
        Ok(notes)
    }

    /// Look up the note on `target`.
    pub fn find(&self, target: ObjectId) -> Result<Option<Note>, RepoError> {
        Ok(self.list(Some(target))?.into_iter().next())
    }

    /// The head commit of the notes chain, if the ref exists.
    pub fn head(&self) -> Result<Option<ObjectId>, RepoError> {
        match self.refs.resolve_name(&self.note_ref) {
            Ok(resolved) => Ok(resolved.target_oid()),
            Err(RefError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The head commit of the notes chain, loaded.
    pub fn head_commit(&self) -> Result<Option<Commit>, RepoError> {
        let Some(oid) = self.head()? else {
            return Ok(None);
        };
        match self.store.read(&oid)? {
            Object::Commit(commit) => Ok(Some(commit)),
            _ => Err(RepoError::Ref(RefError::Parse(format!(
                "notes ref {} does not point at a commit",
                self.note_ref
            )))),
        }
    }

    fn head_tree(&self) -> Result<Tree, RepoError> {
        let commit = self.head_commit()?.ok_or_else(|| {
            RepoError::Ref(RefError::NotFound(self.note_ref.clone()))
        })?;
        match self.store.read(&commit.tree)? {
            Object::Tree(tree) => Ok(tree),
            _ => Err(RepoError::Ref(RefError::Parse(format!(
                "notes commit tree {} is not a tree",
                commit.tree
            )))),
        }
    }

    /// Store the rebuilt tree, commit it with the previous head as parent,
    /// and advance the notes ref.
    fn commit_tree(
        &self,
        builder: TreeBuilder,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, RepoError> {
        let built = builder.build();
        for tree in built.iter() {
            self.store.put_raw(ObjectType::Tree, &tree.serialize_body())?;
        }

        let identity = self.config.identity();
        let mut commit_builder = CommitBuilder::new(built.root_oid())
            .author(identity.clone())
            .committer(identity)
            .message(NOTES_COMMIT_MESSAGE);
        if let Some(parent) = parent {
            commit_builder = commit_builder.parent(parent);
        }

        let commit = commit_builder.build();
        let oid = self.store.put(&Object::Commit(commit))?;
        self.refs.set_oid(&self.note_ref, oid)?;
        Ok(oid)
    }
}

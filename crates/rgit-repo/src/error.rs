use std::path::PathBuf;

use rgit_hash::ObjectId;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not a git repository (or any of the parent directories): {0}")]
    NotARepository(PathBuf),

    #[error("this operation must be run in a work tree")]
    BareRepository,

    #[error("empty branch name is not allowed")]
    EmptyBranchName,

    #[error("branch already exists: {0}")]
    BranchAlreadyExists(String),

    #[error("empty tag name is not allowed")]
    EmptyTagName,

    #[error("tag already exists: {0}")]
    TagAlreadyExists(String),

    #[error("tag target is invalid: {0}")]
    InvalidTagTarget(ObjectId),

    #[error("notes only support commits: {0}")]
    NotesOnNonCommit(ObjectId),

    #[error("cannot overwrite existing note for {0}")]
    NoteAlreadyExists(ObjectId),

    #[error("object {0} has no note")]
    NoteNotFound(ObjectId),

    #[error("malformed config at {path}, line {line}")]
    ConfigParse { path: PathBuf, line: usize },

    #[error(transparent)]
    Ref(#[from] rgit_ref::RefError),

    #[error(transparent)]
    Store(#[from] rgit_store::StoreError),

    #[error(transparent)]
    Object(#[from] rgit_object::ObjectError),

    #[error(transparent)]
    Index(#[from] rgit_index::IndexError),

    #[error(transparent)]
    Walk(#[from] rgit_walk::WalkError),

    #[error(transparent)]
    Util(#[from] rgit_utils::UtilError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

//! Commit chain iteration.
//!
//! A [`CommitCursor`] is an explicit `advance()`/`current()` pair: the first
//! advance yields the seed commit, each further advance follows the first
//! parent. [`Skip`], [`Take`], and [`Filter`] wrap any cursor and compose
//! freely, which keeps "at-most-n" and "skip-then-take" semantics
//! predictable across combinations.

mod cursor;
mod log;

pub use cursor::{Filter, Skip, Take, Walk};
pub use log::{compose_log, LogOptions};

use rgit_hash::ObjectId;
use rgit_object::Commit;

/// Errors from commit iteration.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("object {0} is not a commit")]
    NotACommit(ObjectId),

    #[error(transparent)]
    Store(#[from] rgit_store::StoreError),

    #[error(transparent)]
    Object(#[from] rgit_object::ObjectError),
}

/// A stateful cursor over a commit chain.
///
/// `current()` is meaningful only after `advance()` has returned `true`.
pub trait CommitCursor {
    /// Move to the next commit. Returns `false` when the chain is exhausted.
    fn advance(&mut self) -> Result<bool, WalkError>;

    /// The commit the cursor is positioned on.
    fn current(&self) -> Option<&Commit>;
}

impl<C: CommitCursor + ?Sized> CommitCursor for Box<C> {
    fn advance(&mut self) -> Result<bool, WalkError> {
        (**self).advance()
    }

    fn current(&self) -> Option<&Commit> {
        (**self).current()
    }
}

/// Drain a cursor into a vector of commits.
pub fn collect(mut cursor: impl CommitCursor) -> Result<Vec<Commit>, WalkError> {
    let mut commits = Vec::new();
    while cursor.advance()? {
        if let Some(commit) = cursor.current() {
            commits.push(commit.clone());
        }
    }
    Ok(commits)
}

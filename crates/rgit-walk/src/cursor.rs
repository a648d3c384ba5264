use rgit_hash::ObjectId;
use rgit_object::{Commit, Object};
use rgit_store::ObjectStore;

use crate::{CommitCursor, WalkError};

/// First-parent traversal seeded at a single commit.
pub struct Walk<'a> {
    store: &'a ObjectStore,
    next: Option<ObjectId>,
    current: Option<Commit>,
}

impl<'a> Walk<'a> {
    /// Create a cursor whose first advance yields the commit at `seed`.
    pub fn new(store: &'a ObjectStore, seed: ObjectId) -> Self {
        Self {
            store,
            next: Some(seed),
            current: None,
        }
    }
}

impl CommitCursor for Walk<'_> {
    fn advance(&mut self) -> Result<bool, WalkError> {
        let Some(oid) = self.next else {
            self.current = None;
            return Ok(false);
        };

        let commit = match self.store.read(&oid)? {
            Object::Commit(c) => c,
            _ => return Err(WalkError::NotACommit(oid)),
        };

        self.next = commit.first_parent().copied();
        self.current = Some(commit);
        Ok(true)
    }

    fn current(&self) -> Option<&Commit> {
        self.current.as_ref()
    }
}

/// Advances the inner cursor `n` times before yielding anything.
pub struct Skip<I> {
    inner: I,
    skips: usize,
    skipped: usize,
}

impl<I> Skip<I> {
    pub fn new(inner: I, skips: usize) -> Self {
        Self {
            inner,
            skips,
            skipped: 0,
        }
    }
}

impl<I: CommitCursor> CommitCursor for Skip<I> {
    fn advance(&mut self) -> Result<bool, WalkError> {
        while self.skipped < self.skips {
            if !self.inner.advance()? {
                return Ok(false);
            }
            self.skipped += 1;
        }
        self.inner.advance()
    }

    fn current(&self) -> Option<&Commit> {
        self.inner.current()
    }
}

/// Yields at most `n` commits.
pub struct Take<I> {
    inner: I,
    limit: usize,
    yielded: usize,
}

impl<I> Take<I> {
    pub fn new(inner: I, limit: usize) -> Self {
        Self {
            inner,
            limit,
            yielded: 0,
        }
    }
}

impl<I: CommitCursor> CommitCursor for Take<I> {
    fn advance(&mut self) -> Result<bool, WalkError> {
        if self.yielded >= self.limit {
            return Ok(false);
        }
        if !self.inner.advance()? {
            return Ok(false);
        }
        self.yielded += 1;
        Ok(true)
    }

    fn current(&self) -> Option<&Commit> {
        self.inner.current()
    }
}

/// Advances the inner cursor until the predicate holds.
pub struct Filter<I, P> {
    inner: I,
    predicate: P,
}

impl<I, P> Filter<I, P> {
    pub fn new(inner: I, predicate: P) -> Self {
        Self { inner, predicate }
    }
}

impl<I, P> CommitCursor for Filter<I, P>
where
    I: CommitCursor,
    P: FnMut(&Commit) -> bool,
{
    fn advance(&mut self) -> Result<bool, WalkError> {
        loop {
            if !self.inner.advance()? {
                return Ok(false);
            }
            if let Some(commit) = self.inner.current() {
                if (self.predicate)(commit) {
                    return Ok(true);
                }
            }
        }
    }

    fn current(&self) -> Option<&Commit> {
        self.inner.current()
    }
}

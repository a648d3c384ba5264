//! The cursor composition used by the log operation.

use bstr::ByteSlice;
use regex::Regex;
use rgit_hash::ObjectId;
use rgit_store::ObjectStore;

use crate::cursor::{Filter, Skip, Take, Walk};
use crate::CommitCursor;

/// Options recognized by the log composition.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Keep only commits whose author name matches.
    pub author: Option<Regex>,
    /// Keep only commits authored strictly before this Unix timestamp.
    pub before: Option<i64>,
    /// Keep only commits authored strictly after this Unix timestamp.
    pub after: Option<i64>,
    /// Number of commits to skip before yielding.
    pub skip: usize,
    /// Maximum number of commits to yield.
    pub max_count: Option<usize>,
}

/// Wrap a first-parent walk in the log filters, innermost to outermost:
/// author, before-date, after-date, skip, take.
pub fn compose_log<'a>(
    store: &'a ObjectStore,
    seed: ObjectId,
    options: LogOptions,
) -> Box<dyn CommitCursor + 'a> {
    let mut cursor: Box<dyn CommitCursor + 'a> = Box::new(Walk::new(store, seed));

    if let Some(author) = options.author {
        cursor = Box::new(Filter::new(cursor, move |commit: &rgit_object::Commit| {
            author.is_match(&commit.author.name.to_str_lossy())
        }));
    }

    if let Some(before) = options.before {
        cursor = Box::new(Filter::new(cursor, move |commit: &rgit_object::Commit| {
            commit.author.date.timestamp < before
        }));
    }

    if let Some(after) = options.after {
        cursor = Box::new(Filter::new(cursor, move |commit: &rgit_object::Commit| {
            commit.author.date.timestamp > after
        }));
    }

    if options.skip > 0 {
        cursor = Box::new(Skip::new(cursor, options.skip));
    }

    if let Some(max) = options.max_count {
        cursor = Box::new(Take::new(cursor, max));
    }

    cursor
}

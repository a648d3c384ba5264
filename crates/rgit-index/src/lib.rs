//! The staging area (index).
//!
//! Reads and writes git's binary dir-cache format version 2: a `DIRC`
//! header, sorted entries padded to 8-byte alignment, and a trailing SHA-1
//! over everything before it.

pub mod entry;
mod read;
mod tree;
mod write;

use std::path::Path;

use bstr::{BStr, ByteSlice};
use rgit_hash::ObjectId;
use rgit_object::Blob;
use rgit_store::ObjectStore;

pub use entry::{IndexEntry, Stage, StatData};

/// Errors from index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("invalid index header: {0}")]
    InvalidHeader(String),

    #[error("unsupported index version: {0}")]
    UnsupportedVersion(u32),

    #[error("index checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid index entry at offset {offset}: {reason}")]
    InvalidEntry { offset: usize, reason: String },

    #[error("index entry does not exist: {0}")]
    EntryNotFound(String),

    #[error("unable to lock index at {path}")]
    LockFailed { path: std::path::PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] rgit_store::StoreError),
}

/// The staging index: entries sorted lexicographically by path.
pub struct Index {
    version: u32,
    entries: Vec<IndexEntry>,
}

impl Index {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self {
            version: 2,
            entries: Vec::new(),
        }
    }

    /// Read the index from a file (memory-mapped).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let file = std::fs::File::open(path.as_ref())?;
        let data = unsafe { memmap2::Mmap::map(&file) }?;
        read::parse_index(&data)
    }

    /// Read the index, or produce an empty one if the file does not exist.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        match std::fs::File::open(path.as_ref()) {
            Ok(file) => {
                let data = unsafe { memmap2::Mmap::map(&file) }?;
                read::parse_index(&data)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(IndexError::Io(e)),
        }
    }

    /// Write the index atomically (lock file, fsync, rename).
    pub fn flush(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        write::write_index(self, path.as_ref())
    }

    /// The format version (always 2).
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries, sorted by path.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Look up an entry by path.
    pub fn entry(&self, path: &BStr) -> Option<&IndexEntry> {
        self.entries
            .binary_search_by(|e| e.path.as_slice().cmp(path.as_bytes()))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Insert or replace an entry, keeping the sort order.
    pub fn insert(&mut self, entry: IndexEntry) {
        match self
            .entries
            .binary_search_by(|e| e.path.cmp(&entry.path))
        {
            Ok(pos) => self.entries[pos] = entry,
            Err(pos) => self.entries.insert(pos, entry),
        }
    }

    /// Remove an entry by path. Returns true if one was removed.
    pub fn remove(&mut self, path: &BStr) -> bool {
        match self
            .entries
            .binary_search_by(|e| e.path.as_slice().cmp(path.as_bytes()))
        {
            Ok(pos) => {
                self.entries.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Stage a file from the working tree.
    ///
    /// A no-op when the existing entry's ctime/mtime still match the file on
    /// disk; otherwise the file content is stored as a blob and the entry
    /// replaced.
    pub fn stage_file(
        &mut self,
        worktree: &Path,
        rel_path: &str,
        store: &ObjectStore,
    ) -> Result<(), IndexError> {
        let abs = worktree.join(rel_path);
        let meta = std::fs::metadata(&abs)?;

        if let Some(existing) = self.entry(BStr::new(rel_path.as_bytes())) {
            if existing.stat.matches(&meta) {
                return Ok(());
            }
        }

        let blob = Blob::from_file(&abs)?;
        let oid = store.put_raw(rgit_object::ObjectType::Blob, &blob.data)?;

        self.insert(IndexEntry::from_file(oid, rel_path, &meta));
        Ok(())
    }

    /// Derive a tree hierarchy from the stage-0 entries, persisting every
    /// tree into `store`. Returns the root tree OID.
    pub fn write_tree(&self, store: &ObjectStore) -> Result<ObjectId, IndexError> {
        tree::write_tree(self, store)
    }
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

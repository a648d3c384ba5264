//! Index entry types: `IndexEntry`, `StatData`, `Stage`.

use bstr::BString;
use rgit_hash::ObjectId;
use rgit_object::FileMode;

use crate::IndexError;

/// Merge stage carried in flag bits 13-12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    /// Normal entry (stage 0).
    #[default]
    Regular,
    /// Common ancestor version in a merge conflict (stage 1).
    Base,
    /// Our version in a merge conflict (stage 2).
    Ours,
    /// Their version in a merge conflict (stage 3).
    Theirs,
}

impl Stage {
    pub fn as_u8(&self) -> u8 {
        match self {
            Stage::Regular => 0,
            Stage::Base => 1,
            Stage::Ours => 2,
            Stage::Theirs => 3,
        }
    }

    pub fn from_u8(n: u8) -> Result<Self, IndexError> {
        match n {
            0 => Ok(Stage::Regular),
            1 => Ok(Stage::Base),
            2 => Ok(Stage::Ours),
            3 => Ok(Stage::Theirs),
            _ => Err(IndexError::InvalidEntry {
                offset: 0,
                reason: format!("invalid stage: {n}"),
            }),
        }
    }
}

/// File system stat data cached in the fixed 62-byte entry head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatData {
    pub ctime_secs: u32,
    pub ctime_nsecs: u32,
    pub mtime_secs: u32,
    pub mtime_nsecs: u32,
    pub dev: u32,
    pub ino: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
}

impl StatData {
    /// Capture from file system metadata.
    #[cfg(unix)]
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            ctime_secs: meta.ctime() as u32,
            ctime_nsecs: meta.ctime_nsec() as u32,
            mtime_secs: meta.mtime() as u32,
            mtime_nsecs: meta.mtime_nsec() as u32,
            dev: meta.dev() as u32,
            ino: meta.ino() as u32,
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.len() as u32,
        }
    }

    /// Capture from file system metadata (non-Unix fallback).
    #[cfg(not(unix))]
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        use std::time::UNIX_EPOCH;
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .unwrap_or_default();
        Self {
            ctime_secs: mtime.as_secs() as u32,
            ctime_nsecs: mtime.subsec_nanos(),
            mtime_secs: mtime.as_secs() as u32,
            mtime_nsecs: mtime.subsec_nanos(),
            dev: 0,
            ino: 0,
            uid: 0,
            gid: 0,
            size: meta.len() as u32,
        }
    }

    /// Does the cached ctime/mtime still describe the file on disk?
    pub fn matches(&self, meta: &std::fs::Metadata) -> bool {
        let other = Self::from_metadata(meta);
        self.mtime_secs == other.mtime_secs
            && self.mtime_nsecs == other.mtime_nsecs
            && self.ctime_secs == other.ctime_secs
            && self.ctime_nsecs == other.ctime_nsecs
            && self.size == other.size
    }
}

/// A single entry in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Path relative to the repository root, `/`-separated.
    pub path: BString,
    /// Object ID of the staged blob.
    pub oid: ObjectId,
    /// File mode.
    pub mode: FileMode,
    /// Merge stage.
    pub stage: Stage,
    /// Assume-valid flag (bit 15 of the flags word).
    pub assume_valid: bool,
    /// Cached stat data.
    pub stat: StatData,
}

/// Name length saturates at 0xFFF in the 12-bit flags field.
pub(crate) const NAME_LENGTH_MASK: u16 = 0x0fff;

impl IndexEntry {
    /// Build an entry for a file captured from the working tree.
    pub fn from_file(oid: ObjectId, rel_path: &str, meta: &std::fs::Metadata) -> Self {
        Self {
            path: BString::from(rel_path),
            oid,
            mode: FileMode::Regular,
            stage: Stage::Regular,
            assume_valid: false,
            stat: StatData::from_metadata(meta),
        }
    }

    /// Pack the on-disk flags word: assume_valid (bit 15), stage (13-12),
    /// name length (11-0, clamped).
    pub fn flags_word(&self) -> u16 {
        let mut flags = (self.path.len() as u16).min(NAME_LENGTH_MASK);
        flags |= (self.stage.as_u8() as u16) << 12;
        if self.assume_valid {
            flags |= 0x8000;
        }
        flags
    }
}

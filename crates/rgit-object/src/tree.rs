use std::cmp::Ordering;

use bstr::{BStr, BString, ByteSlice};
use rgit_hash::ObjectId;

use crate::ObjectError;

/// File mode for tree entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// Regular file (100644)
    Regular,
    /// Executable file (100755)
    Executable,
    /// Symbolic link (120000)
    Symlink,
    /// Subdirectory (40000)
    Tree,
    /// Unknown mode (preserved for round-trip)
    Unknown(u32),
}

impl FileMode {
    /// Parse from octal ASCII bytes (e.g., `b"100644"`).
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        let raw = parse_octal(s)
            .ok_or_else(|| ObjectError::InvalidFileMode(String::from_utf8_lossy(s).into()))?;
        Ok(Self::from_raw(raw))
    }

    /// Create from the raw numeric value.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0o100644 => Self::Regular,
            0o100755 => Self::Executable,
            0o120000 => Self::Symlink,
            0o040000 => Self::Tree,
            other => Self::Unknown(other),
        }
    }

    /// Serialize to printed octal without leading zero, git's canonical form.
    pub fn as_bytes(&self) -> BString {
        BString::from(format!("{:o}", self.raw()))
    }

    /// The raw numeric value.
    pub fn raw(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Tree => 0o40000,
            Self::Unknown(v) => *v,
        }
    }

    /// Is this a subtree entry?
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree)
    }

    /// Is this a file entry?
    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Regular | Self::Executable)
    }
}

fn parse_octal(s: &[u8]) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut val: u32 = 0;
    for &b in s {
        if !(b'0'..=b'7').contains(&b) {
            return None;
        }
        val = val.checked_mul(8)?.checked_add(u32::from(b - b'0'))?;
    }
    Some(val)
}

/// A single entry in a tree object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: BString,
    pub oid: ObjectId,
}

impl TreeEntry {
    /// Compare entries using git's canonical tree ordering.
    ///
    /// Subtrees sort as if their name had a trailing '/'; "foo" (dir)
    /// therefore sorts after "foo.c" but before "foo0".
    pub fn cmp_entries(a: &TreeEntry, b: &TreeEntry) -> Ordering {
        collated_name_compare(
            a.name.as_ref(),
            a.mode.is_tree(),
            b.name.as_ref(),
            b.mode.is_tree(),
        )
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        Self::cmp_entries(self, other)
    }
}

/// Compare two entry names with the subtree collation rule: after the
/// common prefix, a directory contributes a virtual '/' where its name ends.
fn collated_name_compare(name1: &[u8], is_dir1: bool, name2: &[u8], is_dir2: bool) -> Ordering {
    let min_len = name1.len().min(name2.len());
    let cmp = name1[..min_len].cmp(&name2[..min_len]);
    if cmp != Ordering::Equal {
        return cmp;
    }
    let next = |name: &[u8], is_dir: bool| {
        if name.len() > min_len {
            name[min_len]
        } else if is_dir {
            b'/'
        } else {
            0
        }
    };
    next(name1, is_dir1).cmp(&next(name2, is_dir2))
}

/// A tree object — an ordered directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse tree body from the binary format.
    ///
    /// Each entry is `<mode-ascii> <name>\0<oid-20-bytes>`.
    pub fn parse(body: &[u8]) -> Result<Self, ObjectError> {
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < body.len() {
            let space_pos = body[pos..]
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| ObjectError::InvalidTreeEntry {
                    offset: pos,
                    reason: "missing space after mode".into(),
                })?
                + pos;

            let mode = FileMode::from_bytes(&body[pos..space_pos]).map_err(|_| {
                ObjectError::InvalidTreeEntry {
                    offset: pos,
                    reason: "invalid mode".into(),
                }
            })?;

            let name_start = space_pos + 1;
            let nul_pos = body[name_start..]
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| ObjectError::InvalidTreeEntry {
                    offset: name_start,
                    reason: "missing NUL after name".into(),
                })?
                + name_start;

            let name = BString::from(&body[name_start..nul_pos]);

            let oid_start = nul_pos + 1;
            let oid_end = oid_start + 20;
            if oid_end > body.len() {
                return Err(ObjectError::InvalidTreeEntry {
                    offset: oid_start,
                    reason: "truncated OID".into(),
                });
            }

            let oid = ObjectId::from_bytes(&body[oid_start..oid_end])?;

            entries.push(TreeEntry { mode, name, oid });
            pos = oid_end;
        }

        Ok(Self { entries })
    }

    /// Serialize the tree body, entries in canonical order.
    pub fn serialize_body(&self) -> Vec<u8> {
        let mut sorted = self.entries.clone();
        sorted.sort();

        let mut out = Vec::new();
        for entry in &sorted {
            out.extend_from_slice(&entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.oid.as_bytes());
        }
        out
    }

    /// Sort entries in canonical order in place.
    pub fn sort(&mut self) {
        self.entries.sort();
    }

    /// Look up an entry by name.
    pub fn find(&self, name: &BStr) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name.as_bstr() == name)
    }

    /// The object identity of this tree.
    pub fn compute_oid(&self) -> ObjectId {
        rgit_hash::Hasher::hash_object("tree", &self.serialize_body())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

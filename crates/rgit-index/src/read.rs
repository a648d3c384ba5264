//! Index file reading (dir-cache v2).

use bstr::BString;
use rgit_hash::{Hasher, ObjectId};
use rgit_object::FileMode;

use crate::entry::{IndexEntry, Stage, StatData, NAME_LENGTH_MASK};
use crate::{Index, IndexError};

/// Magic bytes at the start of every index file.
pub(crate) const INDEX_SIGNATURE: &[u8; 4] = b"DIRC";

/// Bytes of the fixed entry head: 40 stat + 20 OID + 2 flags.
pub(crate) const ENTRY_HEAD_LEN: usize = 62;

/// Parse an index file from raw bytes.
pub fn parse_index(data: &[u8]) -> Result<Index, IndexError> {
    if data.len() < 12 + 20 {
        return Err(IndexError::InvalidHeader("index file too short".into()));
    }

    verify_checksum(data)?;

    let mut cursor = 0;

    let sig = &data[..4];
    if sig != INDEX_SIGNATURE {
        return Err(IndexError::InvalidHeader(format!(
            "bad signature: expected DIRC, got {:?}",
            sig
        )));
    }
    cursor += 4;

    let version = read_u32(&data[cursor..]);
    cursor += 4;
    if version != 2 {
        return Err(IndexError::UnsupportedVersion(version));
    }

    let entry_count = read_u32(&data[cursor..]) as usize;
    cursor += 4;

    let content_end = data.len() - 20;
    let mut entries = Vec::with_capacity(entry_count);
    for _ in 0..entry_count {
        let (entry, next) = parse_entry(data, cursor, content_end)?;
        entries.push(entry);
        cursor = next;
    }

    Ok(Index { version, entries })
}

/// Parse one cache entry starting at `start`; returns the entry and the
/// offset of the next one (8-byte aligned).
fn parse_entry(
    data: &[u8],
    start: usize,
    content_end: usize,
) -> Result<(IndexEntry, usize), IndexError> {
    if start + ENTRY_HEAD_LEN > content_end {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "entry head extends past content".into(),
        });
    }

    let stat = StatData {
        ctime_secs: read_u32(&data[start..]),
        ctime_nsecs: read_u32(&data[start + 4..]),
        mtime_secs: read_u32(&data[start + 8..]),
        mtime_nsecs: read_u32(&data[start + 12..]),
        dev: read_u32(&data[start + 16..]),
        ino: read_u32(&data[start + 20..]),
        uid: read_u32(&data[start + 28..]),
        gid: read_u32(&data[start + 32..]),
        size: read_u32(&data[start + 36..]),
    };
    let mode_raw = read_u32(&data[start + 24..]);

    let oid = ObjectId::from_bytes(&data[start + 40..start + 60]).map_err(|_| {
        IndexError::InvalidEntry {
            offset: start,
            reason: "invalid OID".into(),
        }
    })?;

    let flags = read_u16(&data[start + 60..]);
    let assume_valid = flags & 0x8000 != 0;
    if flags & 0x4000 != 0 {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "extended flag set in v2 index".into(),
        });
    }
    let stage = Stage::from_u8(((flags >> 12) & 0x3) as u8)?;
    let name_length = (flags & NAME_LENGTH_MASK) as usize;

    // Path: name_length bytes plus the terminating NUL.
    let path_start = start + ENTRY_HEAD_LEN;
    let path_end = path_start + name_length;
    if path_end + 1 > content_end {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "path extends past content".into(),
        });
    }
    if data[path_end] != 0 {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "path is not NUL-terminated".into(),
        });
    }
    let path = BString::from(&data[path_start..path_end]);

    // Entry head + name + NUL, padded to the next 8-byte boundary.
    let next = start + entry_size(name_length);
    if next > content_end {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "entry padding extends past content".into(),
        });
    }

    let entry = IndexEntry {
        path,
        oid,
        mode: FileMode::from_raw(mode_raw),
        stage,
        assume_valid,
        stat,
    };
    Ok((entry, next))
}

/// Total on-disk bytes of an entry: 62-byte head + name + NUL, rounded up
/// to a multiple of 8.
pub(crate) fn entry_size(name_length: usize) -> usize {
    let unpadded = ENTRY_HEAD_LEN + name_length + 1;
    (unpadded + 7) & !7
}

/// Verify the trailing SHA-1 over everything before it.
fn verify_checksum(data: &[u8]) -> Result<(), IndexError> {
    let content = &data[..data.len() - 20];
    let stored = &data[data.len() - 20..];
    let computed = Hasher::digest([content]);
    if computed.as_bytes() != stored {
        return Err(IndexError::ChecksumMismatch);
    }
    Ok(())
}

fn read_u32(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}

fn read_u16(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}

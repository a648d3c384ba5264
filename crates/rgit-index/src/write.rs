//! Index file writing.
//!
//! Every emitted byte is teed into a streaming SHA-1 in strict emission
//! order; the final digest is appended as the trailing checksum.

use std::io::Write;
use std::path::Path;

use rgit_hash::Hasher;
use rgit_utils::LockFile;

use crate::entry::IndexEntry;
use crate::read::{entry_size, ENTRY_HEAD_LEN, INDEX_SIGNATURE};
use crate::{Index, IndexError};

/// Write the index atomically. The lock file is fsynced before the rename,
/// so a returned `Ok` means the bytes are durable.
pub fn write_index(index: &Index, path: &Path) -> Result<(), IndexError> {
    let mut lock = LockFile::acquire(path).map_err(|_| IndexError::LockFailed {
        path: path.to_path_buf(),
    })?;

    let mut out = Tee {
        sink: &mut lock,
        hasher: Hasher::new(),
    };

    out.emit(INDEX_SIGNATURE)?;
    out.emit(&2u32.to_be_bytes())?;
    out.emit(&(index.entries().len() as u32).to_be_bytes())?;

    for entry in index.entries() {
        write_entry(&mut out, entry)?;
    }

    let digest = out.hasher.finalize();
    lock.write_all(digest.as_bytes())?;

    lock.commit().map_err(|_| IndexError::LockFailed {
        path: path.to_path_buf(),
    })?;
    Ok(())
}

/// Writer that duplicates every byte into the checksum hasher.
struct Tee<'a, W: Write> {
    sink: &'a mut W,
    hasher: Hasher,
}

impl<W: Write> Tee<'_, W> {
    fn emit(&mut self, bytes: &[u8]) -> Result<(), IndexError> {
        self.sink.write_all(bytes)?;
        self.hasher.update(bytes);
        Ok(())
    }
}

fn write_entry<W: Write>(out: &mut Tee<'_, W>, entry: &IndexEntry) -> Result<(), IndexError> {
    out.emit(&entry.stat.ctime_secs.to_be_bytes())?;
    out.emit(&entry.stat.ctime_nsecs.to_be_bytes())?;
    out.emit(&entry.stat.mtime_secs.to_be_bytes())?;
    out.emit(&entry.stat.mtime_nsecs.to_be_bytes())?;
    out.emit(&entry.stat.dev.to_be_bytes())?;
    out.emit(&entry.stat.ino.to_be_bytes())?;
    out.emit(&entry.mode.raw().to_be_bytes())?;
    out.emit(&entry.stat.uid.to_be_bytes())?;
    out.emit(&entry.stat.gid.to_be_bytes())?;
    out.emit(&entry.stat.size.to_be_bytes())?;
    out.emit(entry.oid.as_bytes())?;
    out.emit(&entry.flags_word().to_be_bytes())?;
    out.emit(&entry.path)?;

    // Trailing NUL plus padding to the next 8-byte boundary.
    let written = ENTRY_HEAD_LEN + entry.path.len();
    let padding = entry_size(entry.path.len()) - written;
    out.emit(&vec![0u8; padding])?;

    Ok(())
}

//! Content-addressed loose object storage.
//!
//! Each object lives at `<objects>/XX/YYYY...` where `XX` is the first byte
//! of the OID in hex and `YYYY...` is the rest. File content is the
//! zlib-compressed `"<type> <size>\0<body>"` bytes exactly as git stores
//! them.

mod find;
mod read;
mod write;

use std::path::{Path, PathBuf};

use rgit_hash::ObjectId;

/// Interface to the object directory (`<gitdir>/objects`).
pub struct ObjectStore {
    objects_dir: PathBuf,
    compression: flate2::Compression,
}

impl ObjectStore {
    /// Open the object store rooted at the given directory.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
            compression: flate2::Compression::default(),
        }
    }

    /// Set the zlib compression level (0-9).
    pub fn set_compression_level(&mut self, level: u32) {
        self.compression = flate2::Compression::new(level);
    }

    /// The objects directory.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// The file path for a given OID.
    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.objects_dir.join(oid.bucket_path())
    }
}

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    #[error("corrupt object {oid}: {reason}")]
    Corrupt { oid: String, reason: String },

    #[error("decompression error for {oid}: {source}")]
    Decompress {
        oid: String,
        #[source]
        source: std::io::Error,
    },

    #[error("object id prefix '{0}' is too short (minimum 4 hex characters)")]
    PrefixTooShort(String),

    #[error("object id prefix '{0}' is not hexadecimal")]
    PrefixNotHex(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Object(#[from] rgit_object::ObjectError),

    #[error(transparent)]
    Hash(#[from] rgit_hash::HashError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_uses_fanout_bucket() {
        let store = ObjectStore::open("/tmp/objects");
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
        assert_eq!(
            store.object_path(&oid),
            PathBuf::from("/tmp/objects/da/39a3ee5e6b4b0d3255bfef95601890afd80709")
        );
    }
}

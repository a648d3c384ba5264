use sha1::{Digest, Sha1};

use crate::ObjectId;

/// Streaming SHA-1 computation.
///
/// Data can be fed incrementally with [`update`](Hasher::update) or through
/// the [`std::io::Write`] implementation, then finalised into an
/// [`ObjectId`]. All object identity in the engine flows through this type
/// so that hashing is bit-identical across components.
pub struct Hasher {
    inner: Sha1,
}

impl Hasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self { inner: Sha1::new() }
    }

    /// Feed a segment of data into the hasher.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalize and return the ObjectId.
    pub fn finalize(self) -> ObjectId {
        ObjectId::from_digest(self.inner.finalize().into())
    }

    /// Convenience: hash any number of byte segments in one call.
    pub fn digest<'a>(segments: impl IntoIterator<Item = &'a [u8]>) -> ObjectId {
        let mut h = Self::new();
        for segment in segments {
            h.update(segment);
        }
        h.finalize()
    }

    /// Hash an object in its on-disk identity form: `"<type> <len>\0<body>"`.
    pub fn hash_object(obj_type: &str, body: &[u8]) -> ObjectId {
        let header = format!("{} {}\0", obj_type, body.len());
        let mut h = Self::new();
        h.update(header.as_bytes());
        h.update(body);
        h.finalize()
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

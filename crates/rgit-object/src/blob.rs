use std::path::Path;

use crate::ObjectError;

/// A blob — an opaque byte payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Capture a file's content as a blob.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            data: std::fs::read(path)?,
        })
    }

    /// Parse blob body. A blob is simply its raw bytes.
    pub fn parse(body: &[u8]) -> Result<Self, ObjectError> {
        Ok(Self {
            data: body.to_vec(),
        })
    }

    /// Serialize: the body is the raw data.
    pub fn serialize_body(&self) -> &[u8] {
        &self.data
    }
}

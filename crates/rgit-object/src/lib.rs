//! Object model for rgit: blob, tree, commit, and tag.
//!
//! This crate provides Rust types for the four object kinds, their parsing
//! from raw bytes, serialization to the exact byte layout git writes on
//! disk, and the builders used to derive trees and commits.

mod blob;
pub mod build;
mod commit;
pub mod header;
mod tag;
mod tree;

pub use blob::Blob;
pub use build::{CommitBuilder, TreeBuilder};
pub use commit::Commit;
pub use tag::Tag;
pub use tree::{FileMode, Tree, TreeEntry};

use bstr::BString;
use rgit_hash::{Hasher, ObjectId};

/// Errors produced by object encode/decode.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("invalid object type: {0}")]
    InvalidType(BString),

    #[error("invalid object header: {0}")]
    InvalidHeader(String),

    #[error("truncated object: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("invalid tree entry at offset {offset}: {reason}")]
    InvalidTreeEntry { offset: usize, reason: String },

    #[error("invalid commit: missing '{field}' header")]
    MissingCommitField { field: &'static str },

    #[error("invalid tag: missing '{field}' header")]
    MissingTagField { field: &'static str },

    #[error("invalid file mode: {0}")]
    InvalidFileMode(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error(transparent)]
    Hash(#[from] rgit_hash::HashError),
}

/// The four kinds of objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    /// Parse from the type tag in object headers.
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        match s {
            b"blob" => Ok(Self::Blob),
            b"tree" => Ok(Self::Tree),
            b"commit" => Ok(Self::Commit),
            b"tag" => Ok(Self::Tag),
            _ => Err(ObjectError::InvalidType(BString::from(s))),
        }
    }

    /// The canonical byte representation.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Blob => b"blob",
            Self::Tree => b"tree",
            Self::Commit => b"commit",
            Self::Tag => b"tag",
        }
    }

    /// The canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectType {
    type Err = ObjectError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

/// A parsed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    /// Parse from raw bytes (header + body).
    pub fn parse(data: &[u8]) -> Result<Self, ObjectError> {
        let (obj_type, body_size, header_len) = header::parse_header(data)?;
        let body = &data[header_len..];
        if body.len() < body_size {
            return Err(ObjectError::Truncated {
                expected: body_size,
                actual: body.len(),
            });
        }
        Self::parse_body(obj_type, &body[..body_size])
    }

    /// Parse from body bytes with a known type (no header).
    pub fn parse_body(obj_type: ObjectType, body: &[u8]) -> Result<Self, ObjectError> {
        match obj_type {
            ObjectType::Blob => Ok(Self::Blob(Blob::parse(body)?)),
            ObjectType::Tree => Ok(Self::Tree(Tree::parse(body)?)),
            ObjectType::Commit => Ok(Self::Commit(Commit::parse(body)?)),
            ObjectType::Tag => Ok(Self::Tag(Tag::parse(body)?)),
        }
    }

    /// Serialize to the canonical on-disk form (header + body).
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let hdr = header::write_header(self.object_type(), body.len());
        let mut out = Vec::with_capacity(hdr.len() + body.len());
        out.extend_from_slice(&hdr);
        out.extend_from_slice(&body);
        out
    }

    /// Serialize just the body (no header).
    pub fn serialize_body(&self) -> Vec<u8> {
        match self {
            Self::Blob(b) => b.serialize_body().to_vec(),
            Self::Tree(t) => t.serialize_body(),
            Self::Commit(c) => c.serialize_body(),
            Self::Tag(t) => t.serialize_body(),
        }
    }

    /// The object type.
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Blob(_) => ObjectType::Blob,
            Self::Tree(_) => ObjectType::Tree,
            Self::Commit(_) => ObjectType::Commit,
            Self::Tag(_) => ObjectType::Tag,
        }
    }

    /// Re-derive the object's identity by hashing its serialized form.
    pub fn compute_oid(&self) -> ObjectId {
        Hasher::hash_object(self.object_type().as_str(), &self.serialize_body())
    }

    /// The body size (excluding header).
    pub fn body_size(&self) -> usize {
        match self {
            Self::Blob(b) => b.data.len(),
            _ => self.serialize_body().len(),
        }
    }
}

//! The reference namespace: named pointers into the object graph.
//!
//! A ref is a file under the git directory holding either a 40-char OID
//! (hash ref) or `ref: <target>` (symbolic ref). `RefStore` persists them
//! with atomic writes and resolves symbolic chains.

mod error;
mod name;
mod store;

pub use error::RefError;
pub use name::RefName;
pub use store::RefStore;

use rgit_hash::ObjectId;

/// Marker that discriminates a symbolic ref's file content.
pub const SYMREF_PREFIX: &str = "ref: ";

/// A named reference — either a hash ref or a symbolic ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Points directly at an object.
    Hash { name: RefName, target: ObjectId },
    /// Points at another ref.
    Symbolic { name: RefName, target: RefName },
}

impl Reference {
    /// The ref's fully qualified name.
    pub fn name(&self) -> &RefName {
        match self {
            Reference::Hash { name, .. } => name,
            Reference::Symbolic { name, .. } => name,
        }
    }

    /// Is this a symbolic ref?
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Reference::Symbolic { .. })
    }

    /// The target OID, if this is a hash ref.
    pub fn target_oid(&self) -> Option<ObjectId> {
        match self {
            Reference::Hash { target, .. } => Some(*target),
            Reference::Symbolic { .. } => None,
        }
    }

    /// The target ref name, if this is a symbolic ref.
    pub fn symbolic_target(&self) -> Option<&RefName> {
        match self {
            Reference::Symbolic { target, .. } => Some(target),
            Reference::Hash { .. } => None,
        }
    }

    /// The value as it is stored on disk (without trailing newline).
    pub fn stored_value(&self) -> String {
        match self {
            Reference::Hash { target, .. } => target.to_hex(),
            Reference::Symbolic { target, .. } => format!("{SYMREF_PREFIX}{target}"),
        }
    }
}

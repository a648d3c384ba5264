//! Hash computation and object identity for the rgit version control engine.
//!
//! This crate provides the core `ObjectId` type, hex encoding/decoding, and
//! the streaming `Hasher` through which every object identifier in the
//! system is computed.

mod error;
pub mod hasher;
pub mod hex;
mod oid;

pub use error::HashError;
pub use hasher::Hasher;
pub use oid::ObjectId;

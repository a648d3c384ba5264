//! Shared plumbing for the rgit version control engine.

pub mod date;
mod error;
pub mod lockfile;

pub use error::{LockError, UtilError};
pub use lockfile::LockFile;

pub type Result<T> = std::result::Result<T, UtilError>;

use std::fmt;

use crate::RefError;

/// A validated reference name, e.g. `HEAD` or `refs/heads/master`.
///
/// Enforces the subset of `git-check-ref-format(1)` the engine relies on:
/// no empty names, no NUL or control bytes, no `..`, no `//`, no leading or
/// trailing `/`, no trailing `.lock`, and none of ` ~^:?*[\`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefName(String);

const FORBIDDEN_CHARS: &[u8] = b" ~^:?*[\\";

impl RefName {
    /// Create and validate a ref name.
    pub fn new(name: impl Into<String>) -> Result<Self, RefError> {
        let name = name.into();
        validate(&name)?;
        Ok(Self(name))
    }

    /// The short name (e.g. `master` from `refs/heads/master`).
    pub fn short_name(&self) -> &str {
        for prefix in ["refs/heads/", "refs/tags/", "refs/notes/", "refs/remotes/"] {
            if let Some(rest) = self.0.strip_prefix(prefix) {
                return rest;
            }
        }
        &self.0
    }

    /// Is this under `refs/heads/`?
    pub fn is_branch(&self) -> bool {
        self.0.starts_with("refs/heads/")
    }

    /// Is this under `refs/tags/`?
    pub fn is_tag(&self) -> bool {
        self.0.starts_with("refs/tags/")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn validate(name: &str) -> Result<(), RefError> {
    let bad = |reason: &str| Err(RefError::InvalidName(format!("'{name}': {reason}")));

    if name.is_empty() {
        return bad("empty name");
    }
    if name.starts_with('/') || name.ends_with('/') {
        return bad("leading or trailing '/'");
    }
    if name.contains("//") {
        return bad("contains '//'");
    }
    if name.contains("..") {
        return bad("contains '..'");
    }
    if name.ends_with(".lock") {
        return bad("ends with '.lock'");
    }
    for b in name.bytes() {
        if b < 0x20 || b == 0x7f {
            return bad("contains control character");
        }
        if FORBIDDEN_CHARS.contains(&b) {
            return bad("contains forbidden character");
        }
    }
    Ok(())
}

use std::fs;

use rgit_hash::{hex, ObjectId};

use crate::{ObjectStore, StoreError};

/// Minimum accepted prefix length, matching C git's MINIMUM_ABBREV.
const MINIMUM_ABBREV: usize = 4;

impl ObjectStore {
    /// Find all stored OIDs whose hex form starts with `prefix`.
    ///
    /// Only the single fan-out bucket named by the first two characters is
    /// scanned. The result is sorted.
    pub fn find_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>, StoreError> {
        if prefix.len() < MINIMUM_ABBREV {
            return Err(StoreError::PrefixTooShort(prefix.to_string()));
        }
        if !hex::is_hex_digits(prefix) {
            return Err(StoreError::PrefixNotHex(prefix.to_string()));
        }

        let prefix = prefix.to_ascii_lowercase();
        let bucket = self.objects_dir().join(&prefix[..2]);

        let entries = match fs::read_dir(&bucket) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut matches = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(rest) = name.to_str() else { continue };

            // Skip temp files and anything else that is not a 38-char tail.
            let hex_name = format!("{}{}", &prefix[..2], rest);
            let Ok(oid) = ObjectId::from_hex(&hex_name) else {
                continue;
            };
            if oid.starts_with_hex(&prefix) {
                matches.push(oid);
            }
        }

        matches.sort();
        Ok(matches)
    }
}

use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use rgit_hash::{Hasher, ObjectId};
use rgit_object::{header, Object, ObjectType};

use crate::{ObjectStore, StoreError};

impl ObjectStore {
    /// Persist an object. Returns its OID.
    ///
    /// A no-op if the object already exists; content addressing guarantees
    /// the bytes on disk are identical.
    pub fn put(&self, obj: &Object) -> Result<ObjectId, StoreError> {
        self.put_raw(obj.object_type(), &obj.serialize_body())
    }

    /// Persist raw body bytes under a known type. Returns the OID.
    pub fn put_raw(&self, obj_type: ObjectType, body: &[u8]) -> Result<ObjectId, StoreError> {
        let hdr = header::write_header(obj_type, body.len());

        // Identity is the hash of the uncompressed header + body.
        let mut hasher = Hasher::new();
        hasher.update(&hdr);
        hasher.update(body);
        let oid = hasher.finalize();

        // Existing object means identical content; do not re-compress.
        if self.contains(&oid) {
            return Ok(oid);
        }

        let final_path = self.object_path(&oid);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = write_compressed_temp(self.objects_dir(), &hdr, body, self.compression)?;
        finalize_object(&tmp_path, &final_path)?;

        Ok(oid)
    }
}

/// Compress header + body into a temp file under the objects dir, so the
/// final rename stays on one filesystem.
fn write_compressed_temp(
    objects_dir: &Path,
    hdr: &[u8],
    body: &[u8],
    level: flate2::Compression,
) -> Result<std::path::PathBuf, StoreError> {
    fs::create_dir_all(objects_dir)?;
    let tmp_path = objects_dir.join(format!(
        "tmp_obj_{}",
        std::process::id()
            ^ std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .subsec_nanos()
    ));

    let file = fs::File::create(&tmp_path)?;
    let mut encoder = ZlibEncoder::new(file, level);
    encoder.write_all(hdr)?;
    encoder.write_all(body)?;
    encoder.finish()?;

    // Objects are immutable; 0444 matches C git.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o444))?;
    }

    Ok(tmp_path)
}

/// Atomically move a temp file into place.
///
/// If the destination appeared in the meantime another writer won the race;
/// the temp file is discarded and the write counts as successful.
fn finalize_object(tmp: &Path, final_path: &Path) -> Result<(), StoreError> {
    match fs::rename(tmp, final_path) {
        Ok(()) => Ok(()),
        Err(_) if final_path.exists() => {
            let _ = fs::remove_file(tmp);
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(tmp);
            Err(StoreError::Io(e))
        }
    }
}

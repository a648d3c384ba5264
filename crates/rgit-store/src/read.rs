use std::fs;
use std::io::Read;

use flate2::read::ZlibDecoder;
use rgit_hash::ObjectId;
use rgit_object::{header, Object, ObjectType};

use crate::{ObjectStore, StoreError};

impl ObjectStore {
    /// Check whether an object exists.
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).is_file()
    }

    /// Read an object's raw bytes (header + body), zlib-inflated.
    pub fn get(&self, oid: &ObjectId) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(oid);
        let compressed = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*oid))
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        decompress_all(&compressed, oid)
    }

    /// Read and parse an object.
    pub fn read(&self, oid: &ObjectId) -> Result<Object, StoreError> {
        let raw = self.get(oid)?;
        Ok(Object::parse(&raw)?)
    }

    /// Read just the header (type + size) without inflating the full body.
    pub fn read_header(&self, oid: &ObjectId) -> Result<(ObjectType, usize), StoreError> {
        let path = self.object_path(oid);
        let compressed = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*oid))
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        // Headers are well under 32 bytes; inflate just enough to see the NUL.
        let mut decoder = ZlibDecoder::new(&compressed[..]);
        let mut buf = [0u8; 64];
        let mut filled = 0;

        loop {
            if filled >= buf.len() {
                return Err(StoreError::Corrupt {
                    oid: oid.to_hex(),
                    reason: "header exceeds 64 bytes".into(),
                });
            }
            let n = decoder
                .read(&mut buf[filled..])
                .map_err(|e| StoreError::Decompress {
                    oid: oid.to_hex(),
                    source: e,
                })?;
            if n == 0 {
                return Err(StoreError::Corrupt {
                    oid: oid.to_hex(),
                    reason: "unexpected EOF before header NUL terminator".into(),
                });
            }
            filled += n;
            if buf[..filled].contains(&0) {
                break;
            }
        }

        let (obj_type, body_size, _) = header::parse_header(&buf[..filled])?;
        Ok((obj_type, body_size))
    }
}

fn decompress_all(compressed: &[u8], oid: &ObjectId) -> Result<Vec<u8>, StoreError> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| StoreError::Decompress {
            oid: oid.to_hex(),
            source: e,
        })?;
    Ok(decompressed)
}

//! The `"<type> <size>\0"` header shared by all object kinds.

use crate::{ObjectError, ObjectType};

/// Parse an object header from raw bytes.
///
/// Returns `(type, body_size, header_length)` where `header_length` includes
/// the NUL terminator.
pub fn parse_header(data: &[u8]) -> Result<(ObjectType, usize, usize), ObjectError> {
    let nul_pos = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| ObjectError::InvalidHeader("missing NUL terminator".into()))?;

    let header = &data[..nul_pos];
    let space_pos = header
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| ObjectError::InvalidHeader("missing space in header".into()))?;

    let obj_type = ObjectType::from_bytes(&header[..space_pos])?;

    let size_str = std::str::from_utf8(&header[space_pos + 1..])
        .map_err(|_| ObjectError::InvalidHeader("non-ASCII size".into()))?;
    let body_size: usize = size_str
        .parse()
        .map_err(|_| ObjectError::InvalidHeader(format!("invalid size: {size_str}")))?;

    Ok((obj_type, body_size, nul_pos + 1))
}

/// Classify a raw buffer by its leading ASCII type tag without fully
/// parsing it.
pub fn detect_type(data: &[u8]) -> Result<ObjectType, ObjectError> {
    let (obj_type, _, _) = parse_header(data)?;
    Ok(obj_type)
}

/// Write an object header: `"<type> <size>\0"`.
pub fn write_header(obj_type: ObjectType, body_size: usize) -> Vec<u8> {
    format!("{} {}\0", obj_type, body_size).into_bytes()
}

use bstr::{BStr, BString, ByteSlice};
use rgit_hash::ObjectId;
use rgit_utils::date::Signature;

use crate::{ObjectError, ObjectType};

/// An annotated tag object.
///
/// The body carries `object`, `type`, `tag`, and `tagger` headers in that
/// order, a blank line, then the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// OID of the tagged object.
    pub target: ObjectId,
    /// Kind of the tagged object.
    pub target_type: ObjectType,
    /// Tag name.
    pub name: BString,
    /// Tagger identity and timestamp.
    pub tagger: Signature,
    /// Tag message, without trailing newlines.
    pub message: BString,
}

impl Tag {
    /// Parse tag body from raw bytes (no object header).
    ///
    /// Headers must appear in order; trailing newlines of the message are
    /// trimmed.
    pub fn parse(body: &[u8]) -> Result<Self, ObjectError> {
        let mut lines = LineReader { data: body, pos: 0 };

        let target_hex = lines.expect_header(b"object")?;
        let target = parse_oid(target_hex)?;

        let target_type = ObjectType::from_bytes(lines.expect_header(b"type")?)?;

        let name = BString::from(lines.expect_header(b"tag")?);

        let tagger_raw = lines.expect_header(b"tagger")?;
        let tagger = Signature::parse(BStr::new(tagger_raw))
            .map_err(|e| ObjectError::InvalidSignature(e.to_string()))?;

        // A single blank line precedes the message.
        lines.expect_blank()?;

        let mut message: &[u8] = &body[lines.pos..];
        while message.last() == Some(&b'\n') {
            message = &message[..message.len() - 1];
        }

        Ok(Self {
            target,
            target_type,
            name,
            tagger,
            message: BString::from(message),
        })
    }

    /// Serialize tag body to bytes (no object header).
    pub fn serialize_body(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"object ");
        out.extend_from_slice(self.target.to_hex().as_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"type ");
        out.extend_from_slice(self.target_type.as_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"tag ");
        out.extend_from_slice(&self.name);
        out.push(b'\n');

        out.extend_from_slice(b"tagger ");
        out.extend_from_slice(&self.tagger.to_bytes());
        out.push(b'\n');

        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out.push(b'\n');

        out
    }

    /// The object identity of this tag.
    pub fn compute_oid(&self) -> ObjectId {
        rgit_hash::Hasher::hash_object("tag", &self.serialize_body())
    }
}

struct LineReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> LineReader<'a> {
    fn next_line(&mut self) -> Option<&'a [u8]> {
        if self.pos >= self.data.len() {
            return None;
        }
        let end = self.data[self.pos..]
            .find_byte(b'\n')
            .map(|p| p + self.pos)
            .unwrap_or(self.data.len());
        let line = &self.data[self.pos..end];
        self.pos = end + 1;
        Some(line)
    }

    /// Read the next line and require it to be `<key> <value>`.
    fn expect_header(&mut self, key: &'static [u8]) -> Result<&'a [u8], ObjectError> {
        let missing = || ObjectError::MissingTagField {
            // key is a static ASCII literal
            field: std::str::from_utf8(key).unwrap_or("?"),
        };
        let line = self.next_line().ok_or_else(missing)?;
        let space_pos = line.iter().position(|&b| b == b' ').ok_or_else(missing)?;
        if &line[..space_pos] != key {
            return Err(missing());
        }
        Ok(&line[space_pos + 1..])
    }

    fn expect_blank(&mut self) -> Result<(), ObjectError> {
        match self.next_line() {
            Some(line) if line.is_empty() => Ok(()),
            _ => Err(ObjectError::InvalidHeader(
                "missing blank line before tag message".into(),
            )),
        }
    }
}

fn parse_oid(value: &[u8]) -> Result<ObjectId, ObjectError> {
    let hex = std::str::from_utf8(value)
        .map_err(|_| ObjectError::InvalidHeader("non-UTF8 target OID".into()))?;
    Ok(ObjectId::from_hex(hex)?)
}

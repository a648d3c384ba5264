use bstr::{BStr, BString, ByteSlice};
use rgit_hash::ObjectId;
use rgit_utils::date::Signature;

use crate::ObjectError;

/// A commit object.
///
/// The body is line-oriented in fixed order: one `tree`, zero or more
/// `parent`, one `author`, one `committer`, a blank line, then the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// OID of the root tree.
    pub tree: ObjectId,
    /// Parent commit OIDs (empty for a root commit).
    pub parents: Vec<ObjectId>,
    /// Author identity and timestamp.
    pub author: Signature,
    /// Committer identity and timestamp.
    pub committer: Signature,
    /// Commit message (everything after the blank-line separator).
    pub message: BString,
}

impl Commit {
    /// Parse commit body from raw bytes (no object header).
    pub fn parse(body: &[u8]) -> Result<Self, ObjectError> {
        let mut tree: Option<ObjectId> = None;
        let mut parents = Vec::new();
        let mut author: Option<Signature> = None;
        let mut committer: Option<Signature> = None;

        let mut pos = 0;
        loop {
            if pos >= body.len() {
                break;
            }
            // A blank line separates headers from the message.
            if body[pos] == b'\n' {
                pos += 1;
                break;
            }

            let line_end = body[pos..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|p| p + pos)
                .unwrap_or(body.len());
            let line = &body[pos..line_end];

            if let Some(space_pos) = line.iter().position(|&b| b == b' ') {
                let key = &line[..space_pos];
                let value = &line[space_pos + 1..];

                match key {
                    b"tree" => tree = Some(parse_oid(value, "tree")?),
                    b"parent" => parents.push(parse_oid(value, "parent")?),
                    b"author" => author = Some(parse_signature(value)?),
                    b"committer" => committer = Some(parse_signature(value)?),
                    _ => {}
                }
            }

            pos = line_end + 1;
        }

        let tree = tree.ok_or(ObjectError::MissingCommitField { field: "tree" })?;
        let author = author.ok_or(ObjectError::MissingCommitField { field: "author" })?;
        let committer =
            committer.ok_or(ObjectError::MissingCommitField { field: "committer" })?;

        Ok(Self {
            tree,
            parents,
            author,
            committer,
            message: BString::from(&body[pos.min(body.len())..]),
        })
    }

    /// Serialize commit body to bytes (no object header).
    pub fn serialize_body(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"tree ");
        out.extend_from_slice(self.tree.to_hex().as_bytes());
        out.push(b'\n');

        for parent in &self.parents {
            out.extend_from_slice(b"parent ");
            out.extend_from_slice(parent.to_hex().as_bytes());
            out.push(b'\n');
        }

        out.extend_from_slice(b"author ");
        out.extend_from_slice(&self.author.to_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"committer ");
        out.extend_from_slice(&self.committer.to_bytes());
        out.push(b'\n');

        out.push(b'\n');
        out.extend_from_slice(&self.message);

        out
    }

    /// The object identity of this commit.
    pub fn compute_oid(&self) -> ObjectId {
        rgit_hash::Hasher::hash_object("commit", &self.serialize_body())
    }

    /// The first parent, or None for a root commit.
    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// Does this commit have no parents?
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// The first line of the message.
    pub fn summary(&self) -> &BStr {
        let msg: &[u8] = self.message.as_ref();
        match msg.find_byte(b'\n') {
            Some(pos) => BStr::new(&msg[..pos]),
            None => BStr::new(msg),
        }
    }
}

fn parse_oid(value: &[u8], field: &'static str) -> Result<ObjectId, ObjectError> {
    let hex = std::str::from_utf8(value)
        .map_err(|_| ObjectError::InvalidHeader(format!("non-UTF8 {field} OID")))?;
    Ok(ObjectId::from_hex(hex)?)
}

fn parse_signature(data: &[u8]) -> Result<Signature, ObjectError> {
    Signature::parse(BStr::new(data))
        .map_err(|e| ObjectError::InvalidSignature(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_commit_bytes() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"tree da39a3ee5e6b4b0d3255bfef95601890afd80709\n");
        out.extend_from_slice(b"parent 0000000000000000000000000000000000000001\n");
        out.extend_from_slice(b"author John Doe <john@example.com> 1234567890 +0000\n");
        out.extend_from_slice(b"committer Jane Doe <jane@example.com> 1234567890 +0000\n");
        out.extend_from_slice(b"\n");
        out.extend_from_slice(b"Initial commit\n");
        out
    }

    #[test]
    fn parse_commit() {
        let commit = Commit::parse(&sample_commit_bytes()).unwrap();
        assert_eq!(
            commit.tree.to_hex(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(commit.parents.len(), 1);
        assert_eq!(commit.author.name, "John Doe");
        assert_eq!(commit.committer.email, "jane@example.com");
        assert_eq!(commit.message, "Initial commit\n");
    }

    #[test]
    fn parse_root_commit() {
        let mut data = Vec::new();
        data.extend_from_slice(b"tree da39a3ee5e6b4b0d3255bfef95601890afd80709\n");
        data.extend_from_slice(b"author A <a@b.com> 1000000000 +0000\n");
        data.extend_from_slice(b"committer A <a@b.com> 1000000000 +0000\n");
        data.extend_from_slice(b"\nroot\n");

        let commit = Commit::parse(&data).unwrap();
        assert!(commit.is_root());
        assert!(commit.first_parent().is_none());
    }

    #[test]
    fn parse_merge_commit() {
        let mut data = Vec::new();
        data.extend_from_slice(b"tree da39a3ee5e6b4b0d3255bfef95601890afd80709\n");
        data.extend_from_slice(b"parent 0000000000000000000000000000000000000001\n");
        data.extend_from_slice(b"parent 0000000000000000000000000000000000000002\n");
        data.extend_from_slice(b"author A <a@b.com> 1000000000 +0000\n");
        data.extend_from_slice(b"committer A <a@b.com> 1000000000 +0000\n");
        data.extend_from_slice(b"\nMerge\n");

        let commit = Commit::parse(&data).unwrap();
        assert_eq!(commit.parents.len(), 2);
        assert_eq!(
            commit.first_parent().unwrap().to_hex(),
            "0000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn message_keeps_embedded_newlines() {
        let mut data = Vec::new();
        data.extend_from_slice(b"tree da39a3ee5e6b4b0d3255bfef95601890afd80709\n");
        data.extend_from_slice(b"author A <a@b.com> 1000000000 +0000\n");
        data.extend_from_slice(b"committer A <a@b.com> 1000000000 +0000\n");
        data.extend_from_slice(b"\nSummary line\n\nBody paragraph.\n");

        let commit = Commit::parse(&data).unwrap();
        assert_eq!(commit.summary(), "Summary line");
        assert_eq!(commit.message, "Summary line\n\nBody paragraph.\n");
    }

    #[test]
    fn serialize_roundtrip() {
        let original = sample_commit_bytes();
        let commit = Commit::parse(&original).unwrap();
        assert_eq!(commit.serialize_body(), original);
    }

    #[test]
    fn known_oid_vector() {
        let mut data = Vec::new();
        data.extend_from_slice(b"tree 80fa9593f3c3d03f011492504e5d877b97b1277f\n");
        data.extend_from_slice(
            b"author Furisto <24721048+Furisto@users.noreply.github.com> 1609952762 +0100\n",
        );
        data.extend_from_slice(
            b"committer Furisto <24721048+Furisto@users.noreply.github.com> 1609952762 +0100\n",
        );
        data.extend_from_slice(b"\nprint commit\n");

        let commit = Commit::parse(&data).unwrap();
        assert!(commit.is_root());
        assert_eq!(data.len(), 215);
        assert_eq!(
            commit.compute_oid().to_hex(),
            "3ab896244757f512b43eb80384463d4dd9334384"
        );
    }

    #[test]
    fn missing_tree_errors() {
        let data = b"author A <a@b.com> 1000000000 +0000\ncommitter A <a@b.com> 1000000000 +0000\n\nmsg\n";
        assert!(matches!(
            Commit::parse(data),
            Err(ObjectError::MissingCommitField { field: "tree" })
        ));
    }

    #[test]
    fn missing_committer_errors() {
        let data = b"tree da39a3ee5e6b4b0d3255bfef95601890afd80709\nauthor A <a@b.com> 1000000000 +0000\n\nmsg\n";
        assert!(matches!(
            Commit::parse(data),
            Err(ObjectError::MissingCommitField { field: "committer" })
        ));
    }
}

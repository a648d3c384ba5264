use bstr::{BStr, BString};
use rgit_hash::ObjectId;
use rgit_index::{Index, IndexEntry, IndexError, Stage, StatData};
use rgit_object::{Blob, FileMode, Object};
use rgit_store::ObjectStore;

/// The fixture staged throughout these tests: directories "0" and "1", each
/// holding files "0" and "1" whose content is the directory name followed by
/// the file name ("00", "01", "10", "11").
fn fixture_entry(dir: usize, file: usize) -> IndexEntry {
    let content = format!("{dir}{file}");
    let blob = Object::Blob(Blob::new(content.into_bytes()));
    IndexEntry {
        path: BString::from(format!("{dir}/{file}")),
        oid: blob.compute_oid(),
        mode: FileMode::Regular,
        stage: Stage::Regular,
        assume_valid: false,
        stat: StatData::default(),
    }
}

fn fixture_index() -> Index {
    let mut index = Index::new();
    for dir in 0..2 {
        for file in 0..2 {
            index.insert(fixture_entry(dir, file));
        }
    }
    index
}

#[test]
fn roundtrip_preserves_entries_and_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index");

    let index = fixture_index();
    index.flush(&path).unwrap();

    let reloaded = Index::load(&path).unwrap();
    assert_eq!(reloaded.version(), 2);
    assert_eq!(reloaded.len(), 4);

    let paths: Vec<_> = reloaded
        .entries()
        .iter()
        .map(|e| e.path.to_string())
        .collect();
    assert_eq!(paths, vec!["0/0", "0/1", "1/0", "1/1"]);

    for entry in reloaded.entries() {
        assert_eq!(entry.mode, FileMode::Regular);
        assert_eq!(entry.flags_word(), 3);
    }

    // Re-encoding reproduces the byte sequence including the trailing digest.
    let first_bytes = std::fs::read(&path).unwrap();
    let path2 = dir.path().join("index2");
    reloaded.flush(&path2).unwrap();
    assert_eq!(std::fs::read(&path2).unwrap(), first_bytes);
}

#[test]
fn entries_are_eight_byte_aligned() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index");

    fixture_index().flush(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();

    // header(12) + 4 entries of 72 bytes (62 + 3 + 1 padded) + digest(20)
    assert_eq!(bytes.len(), 12 + 4 * 72 + 20);
}

#[test]
fn checksum_mismatch_detected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index");

    fixture_index().flush(&path).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xff;
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        Index::load(&path),
        Err(IndexError::ChecksumMismatch)
    ));
}

#[test]
fn bad_magic_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index");

    fixture_index().flush(&path).unwrap();
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[0] = b'X';
    // Fix up the checksum so the magic check is what fails.
    let content_len = bytes.len() - 20;
    let digest = rgit_hash::Hasher::digest([&bytes[..content_len]]);
    bytes[content_len..].copy_from_slice(digest.as_bytes());
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        Index::load(&path),
        Err(IndexError::InvalidHeader(_))
    ));
}

#[test]
fn unsupported_version_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index");

    fixture_index().flush(&path).unwrap();
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[7] = 3; // version lives at offset 4..8, big-endian
    let content_len = bytes.len() - 20;
    let digest = rgit_hash::Hasher::digest([&bytes[..content_len]]);
    bytes[content_len..].copy_from_slice(digest.as_bytes());
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        Index::load(&path),
        Err(IndexError::UnsupportedVersion(3))
    ));
}

#[test]
fn load_or_empty_handles_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let index = Index::load_or_empty(dir.path().join("index")).unwrap();
    assert!(index.is_empty());
}

#[test]
fn write_tree_matches_known_oids() {
    let dir = tempfile::tempdir().unwrap();
    let store = ObjectStore::open(dir.path().join("objects"));

    let root_oid = fixture_index().write_tree(&store).unwrap();

    let root = match store.read(&root_oid).unwrap() {
        Object::Tree(t) => t,
        other => panic!("expected tree, got {other:?}"),
    };

    assert_eq!(root.len(), 2);
    assert_eq!(root.entries[0].name, "0");
    assert_eq!(root.entries[0].mode, FileMode::Tree);
    assert_eq!(
        root.entries[0].oid.to_hex(),
        "9aacd487c128e9d564997629c0c4257f44183aaf"
    );
    assert_eq!(root.entries[1].name, "1");
    assert_eq!(root.entries[1].mode, FileMode::Tree);
    assert_eq!(
        root.entries[1].oid.to_hex(),
        "44f70e4f280f5641a30d69706500490032ccce59"
    );

    // Every subtree was persisted as well.
    assert!(store.contains(&root.entries[0].oid));
    assert!(store.contains(&root.entries[1].oid));
}

#[test]
fn empty_index_writes_empty_tree() {
    let dir = tempfile::tempdir().unwrap();
    let store = ObjectStore::open(dir.path().join("objects"));

    let root_oid = Index::new().write_tree(&store).unwrap();
    // The canonical empty tree.
    assert_eq!(root_oid.to_hex(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    assert!(store.contains(&root_oid));
}

#[test]
fn conflicted_stages_excluded_from_tree() {
    let dir = tempfile::tempdir().unwrap();
    let store = ObjectStore::open(dir.path().join("objects"));

    let mut index = fixture_index();
    let mut conflicted = fixture_entry(0, 0);
    conflicted.path = BString::from("conflicted");
    conflicted.stage = Stage::Ours;
    index.insert(conflicted);

    let root_oid = index.write_tree(&store).unwrap();
    let root = match store.read(&root_oid).unwrap() {
        Object::Tree(t) => t,
        other => panic!("expected tree, got {other:?}"),
    };
    assert!(root.find(BStr::new("conflicted")).is_none());
}

#[test]
fn stage_file_stores_blob_and_is_stat_aware() {
    let dir = tempfile::tempdir().unwrap();
    let worktree = dir.path().join("wt");
    std::fs::create_dir_all(worktree.join("src")).unwrap();
    std::fs::write(worktree.join("src/main.rs"), b"fn main() {}\n").unwrap();

    let store = ObjectStore::open(dir.path().join("objects"));
    let mut index = Index::new();

    index.stage_file(&worktree, "src/main.rs", &store).unwrap();
    assert_eq!(index.len(), 1);

    let entry = index.entry(BStr::new("src/main.rs")).unwrap();
    let expected = Object::Blob(Blob::new(b"fn main() {}\n".to_vec())).compute_oid();
    assert_eq!(entry.oid, expected);
    assert!(store.contains(&expected));

    // Unchanged file: staging again is a no-op.
    let before = entry.clone();
    index.stage_file(&worktree, "src/main.rs", &store).unwrap();
    assert_eq!(index.entry(BStr::new("src/main.rs")).unwrap(), &before);
}

#[test]
fn remove_deletes_by_key() {
    let mut index = fixture_index();
    assert!(index.remove(BStr::new("0/1")));
    assert!(!index.remove(BStr::new("0/1")));
    assert_eq!(index.len(), 3);
    assert!(index.entry(BStr::new("0/1")).is_none());
}

#[test]
fn oid_parses_as_valid_object_id() {
    for entry in fixture_index().entries() {
        let hex = entry.oid.to_hex();
        assert_eq!(ObjectId::from_hex(&hex).unwrap(), entry.oid);
    }
}

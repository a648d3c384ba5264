use rgit_hash::Hasher;
use rgit_object::{Blob, Object, ObjectType};
use rgit_store::{ObjectStore, StoreError};

fn temp_store() -> (tempfile::TempDir, ObjectStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = ObjectStore::open(dir.path().join("objects"));
    (dir, store)
}

#[test]
fn put_then_get_roundtrip() {
    let (_dir, store) = temp_store();

    let obj = Object::Blob(Blob::new(b"Hello Git!".to_vec()));
    let oid = store.put(&obj).unwrap();
    assert_eq!(oid, obj.compute_oid());

    let raw = store.get(&oid).unwrap();
    assert_eq!(raw, b"blob 10\0Hello Git!");

    let read_back = store.read(&oid).unwrap();
    assert_eq!(read_back, obj);
}

#[test]
fn stored_bytes_hash_back_to_oid() {
    let (_dir, store) = temp_store();

    let oid = store.put_raw(ObjectType::Blob, b"some content").unwrap();
    let raw = store.get(&oid).unwrap();
    assert_eq!(Hasher::digest([raw.as_slice()]), oid);
}

#[test]
fn contains_reports_existence() {
    let (_dir, store) = temp_store();

    let obj = Object::Blob(Blob::new(b"x".to_vec()));
    assert!(!store.contains(&obj.compute_oid()));
    let oid = store.put(&obj).unwrap();
    assert!(store.contains(&oid));
}

#[test]
fn get_missing_is_not_found() {
    let (_dir, store) = temp_store();
    let oid = Object::Blob(Blob::new(b"never stored".to_vec())).compute_oid();
    assert!(matches!(store.get(&oid), Err(StoreError::NotFound(_))));
}

#[test]
fn put_is_idempotent() {
    let (_dir, store) = temp_store();

    let obj = Object::Blob(Blob::new(b"same content".to_vec()));
    let first = store.put(&obj).unwrap();

    let path = store.object_path(&first);
    let mtime_before = std::fs::metadata(&path).unwrap().modified().unwrap();

    let second = store.put(&obj).unwrap();
    assert_eq!(first, second);

    // The existing object must not have been rewritten.
    let mtime_after = std::fs::metadata(&path).unwrap().modified().unwrap();
    assert_eq!(mtime_before, mtime_after);
}

#[test]
fn read_header_without_full_body() {
    let (_dir, store) = temp_store();

    let body = vec![0x42u8; 4096];
    let oid = store.put_raw(ObjectType::Blob, &body).unwrap();

    let (obj_type, size) = store.read_header(&oid).unwrap();
    assert_eq!(obj_type, ObjectType::Blob);
    assert_eq!(size, 4096);
}

#[test]
fn corrupt_zlib_stream_is_reported() {
    let (_dir, store) = temp_store();

    let obj = Object::Blob(Blob::new(b"will be corrupted".to_vec()));
    let oid = store.put(&obj).unwrap();

    let path = store.object_path(&oid);
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    perms.set_readonly(false);
    std::fs::set_permissions(&path, perms).unwrap();
    std::fs::write(&path, b"not a zlib stream").unwrap();

    assert!(matches!(
        store.get(&oid),
        Err(StoreError::Decompress { .. })
    ));
}

#[test]
fn find_prefix_matches_only_in_bucket() {
    let (_dir, store) = temp_store();

    let a = store.put_raw(ObjectType::Blob, b"alpha").unwrap();
    let b = store.put_raw(ObjectType::Blob, b"beta").unwrap();

    let found = store.find_prefix(&a.to_hex()[..6]).unwrap();
    assert_eq!(found, vec![a]);

    let found = store.find_prefix(&b.to_hex()[..8]).unwrap();
    assert_eq!(found, vec![b]);
}

#[test]
fn find_prefix_full_oid() {
    let (_dir, store) = temp_store();
    let oid = store.put_raw(ObjectType::Blob, b"gamma").unwrap();
    let found = store.find_prefix(&oid.to_hex()).unwrap();
    assert_eq!(found, vec![oid]);
}

#[test]
fn object_kinds_roundtrip_through_store() {
    use bstr::BString;
    use rgit_object::{Commit, FileMode, Tree, TreeEntry};
    use rgit_utils::date::{GitDate, Signature};

    let (_dir, store) = temp_store();

    let blob_oid = store.put_raw(ObjectType::Blob, b"content").unwrap();

    let tree = Object::Tree(Tree {
        entries: vec![TreeEntry {
            mode: FileMode::Regular,
            name: BString::from("file.txt"),
            oid: blob_oid,
        }],
    });
    let tree_oid = store.put(&tree).unwrap();

    let commit = Object::Commit(Commit {
        tree: tree_oid,
        parents: vec![],
        author: Signature {
            name: BString::from("A"),
            email: BString::from("a@b.com"),
            date: GitDate::new(1000000000, 0),
        },
        committer: Signature {
            name: BString::from("A"),
            email: BString::from("a@b.com"),
            date: GitDate::new(1000000000, 0),
        },
        message: BString::from("msg\n"),
    });
    let commit_oid = store.put(&commit).unwrap();

    assert_eq!(store.read(&tree_oid).unwrap(), tree);
    assert_eq!(store.read(&commit_oid).unwrap(), commit);
    assert_eq!(
        store.read_header(&commit_oid).unwrap().0,
        ObjectType::Commit
    );
}

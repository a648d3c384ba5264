//! Directory → tree derivation.

use std::path::Path;

use bstr::BString;
use rgit_hash::ObjectId;
use rgit_object::{Blob, FileMode, Object, Tree, TreeEntry};
use rgit_store::ObjectStore;

use crate::RepoError;

/// An in-memory capture of a working directory as a tree hierarchy.
///
/// Capturing is side-effect free; nothing reaches the object store until
/// [`persist`](Snapshot::persist) is called.
pub struct Snapshot {
    root: Tree,
    /// Blobs and subtrees of the hierarchy, children before parents.
    objects: Vec<Object>,
}

impl Snapshot {
    /// Recursively capture `root`, skipping `.git` unconditionally.
    pub fn capture(root: &Path) -> Result<Self, RepoError> {
        let mut objects = Vec::new();
        let root = capture_dir(root, &mut objects)?;
        Ok(Self { root, objects })
    }

    /// The root tree.
    pub fn root_tree(&self) -> &Tree {
        &self.root
    }

    /// The identity of the root tree.
    pub fn root_oid(&self) -> ObjectId {
        self.root.compute_oid()
    }

    /// Store every captured object plus the root tree. Returns the root OID.
    pub fn persist(&self, store: &ObjectStore) -> Result<ObjectId, RepoError> {
        for obj in &self.objects {
            store.put(obj)?;
        }
        Ok(store.put(&Object::Tree(self.root.clone()))?)
    }
}

fn capture_dir(path: &Path, objects: &mut Vec<Object>) -> Result<Tree, RepoError> {
    let mut entries = Vec::new();

    let mut dir_entries: Vec<_> =
        std::fs::read_dir(path)?.collect::<Result<Vec<_>, _>>()?;
    dir_entries.sort_by_key(|e| e.file_name());

    for entry in dir_entries {
        let file_name = entry.file_name();
        if file_name == ".git" {
            continue;
        }
        let name = BString::from(file_name.to_string_lossy().as_bytes());
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            let subtree = capture_dir(&entry.path(), objects)?;
            entries.push(TreeEntry {
                mode: FileMode::Tree,
                name,
                oid: subtree.compute_oid(),
            });
            objects.push(Object::Tree(subtree));
        } else if file_type.is_file() {
            let blob = Blob::from_file(entry.path())?;
            let mode = file_mode_of(&entry.metadata()?);
            let obj = Object::Blob(blob);
            entries.push(TreeEntry {
                mode,
                name,
                oid: obj.compute_oid(),
            });
            objects.push(obj);
        }
        // Sockets, fifos, and symlinks are not captured.
    }

    let mut tree = Tree { entries };
    tree.sort();
    Ok(tree)
}

#[cfg(unix)]
fn file_mode_of(meta: &std::fs::Metadata) -> FileMode {
    use std::os::unix::fs::PermissionsExt;
    if meta.permissions().mode() & 0o111 != 0 {
        FileMode::Executable
    } else {
        FileMode::Regular
    }
}

#[cfg(not(unix))]
fn file_mode_of(_meta: &std::fs::Metadata) -> FileMode {
    FileMode::Regular
}

#[cfg(test)]
mod tests {
    use super::*;
    use bstr::BStr;

    fn populate_fixture(root: &Path) {
        // Five directories "0".."4", each with files "0" and "1" holding the
        // directory name plus the file name.
        for i in 0..5 {
            let dir = root.join(i.to_string());
            std::fs::create_dir_all(&dir).unwrap();
            for j in 0..2 {
                std::fs::write(dir.join(j.to_string()), format!("{i}{j}")).unwrap();
            }
        }
    }

    #[test]
    fn capture_is_side_effect_free() {
        let dir = tempfile::tempdir().unwrap();
        populate_fixture(dir.path());

        let store_dir = dir.path().join("store");
        let store = ObjectStore::open(&store_dir);

        let snapshot = Snapshot::capture(dir.path()).unwrap();
        assert!(!snapshot.root_oid().is_null());
        assert!(!store_dir.exists());

        snapshot.persist(&store).unwrap();
        assert!(store.contains(&snapshot.root_oid()));
    }

    #[test]
    fn fixture_matches_known_root() {
        let dir = tempfile::tempdir().unwrap();
        populate_fixture(dir.path());

        let snapshot = Snapshot::capture(dir.path()).unwrap();
        assert_eq!(
            snapshot.root_oid().to_hex(),
            "80fa9593f3c3d03f011492504e5d877b97b1277f"
        );
        assert_eq!(snapshot.root_tree().len(), 5);
    }

    #[test]
    fn git_dir_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git/refs")).unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/master\n").unwrap();
        std::fs::write(dir.path().join("tracked.txt"), "content").unwrap();

        let snapshot = Snapshot::capture(dir.path()).unwrap();
        assert!(snapshot.root_tree().find(BStr::new(".git")).is_none());
        assert!(snapshot.root_tree().find(BStr::new("tracked.txt")).is_some());
    }

    #[test]
    fn persisted_subtrees_are_readable() {
        let dir = tempfile::tempdir().unwrap();
        populate_fixture(dir.path());

        let store = ObjectStore::open(dir.path().join("store"));
        let snapshot = Snapshot::capture(dir.path()).unwrap();
        let root_oid = snapshot.persist(&store).unwrap();

        let root = match store.read(&root_oid).unwrap() {
            Object::Tree(t) => t,
            other => panic!("expected tree, got {other:?}"),
        };
        for entry in root.iter() {
            assert!(store.contains(&entry.oid), "missing subtree {}", entry.name);
        }
    }
}

//! Index → tree derivation.

use bstr::ByteSlice;
use rgit_hash::ObjectId;
use rgit_object::{ObjectType, TreeBuilder};
use rgit_store::ObjectStore;

use crate::{Index, IndexError, Stage};

/// Group the stage-0 entries by directory, build a `TreeBuilder` per
/// directory, finalize bottom-up, and persist every tree. Returns the root
/// tree OID.
pub fn write_tree(index: &Index, store: &ObjectStore) -> Result<ObjectId, IndexError> {
    let mut root = TreeBuilder::new();

    for entry in index.entries() {
        if entry.stage != Stage::Regular {
            continue;
        }

        let components: Vec<&[u8]> = entry.path.split_str("/").collect();
        let Some((leaf, dirs)) = components.split_last() else {
            continue;
        };

        let mut builder = &mut root;
        for dir in dirs {
            builder = builder.subtree_mut(*dir);
        }
        builder.add_blob(entry.oid, *leaf, entry.mode);
    }

    let built = root.build();
    for tree in built.iter() {
        store.put_raw(ObjectType::Tree, &tree.serialize_body())?;
    }
    Ok(built.root_oid())
}

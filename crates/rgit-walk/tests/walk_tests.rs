use bstr::BString;
use regex::Regex;
use rgit_hash::ObjectId;
use rgit_object::{Blob, Commit, Object, ObjectType};
use rgit_store::ObjectStore;
use rgit_utils::date::{GitDate, Signature};
use rgit_walk::{collect, compose_log, CommitCursor, Filter, LogOptions, Skip, Take, Walk};

fn sig(name: &str, ts: i64) -> Signature {
    Signature {
        name: BString::from(name),
        email: BString::from(format!("{name}@example.com")),
        date: GitDate::new(ts, 0),
    }
}

/// Build a first-parent chain of `n` commits with ascending timestamps and
/// return their OIDs oldest-first.
fn build_chain(store: &ObjectStore, n: usize) -> Vec<ObjectId> {
    build_chain_by(store, n, |i| sig("tester", 1_600_000_000 + i as i64))
}

fn build_chain_by(
    store: &ObjectStore,
    n: usize,
    author_of: impl Fn(usize) -> Signature,
) -> Vec<ObjectId> {
    let tree = store
        .put_raw(ObjectType::Blob, b"chain file content")
        .map(|blob_oid| {
            let tree = rgit_object::Tree {
                entries: vec![rgit_object::TreeEntry {
                    mode: rgit_object::FileMode::Regular,
                    name: BString::from("file"),
                    oid: blob_oid,
                }],
            };
            store
                .put_raw(ObjectType::Tree, &tree.serialize_body())
                .unwrap()
        })
        .unwrap();

    let mut oids = Vec::with_capacity(n);
    let mut parent: Option<ObjectId> = None;
    for i in 0..n {
        let author = author_of(i);
        let commit = Commit {
            tree,
            parents: parent.into_iter().collect(),
            author: author.clone(),
            committer: author,
            message: BString::from(format!("commit {i}\n")),
        };
        let oid = store.put(&Object::Commit(commit)).unwrap();
        oids.push(oid);
        parent = Some(oid);
    }
    oids
}

fn temp_store() -> (tempfile::TempDir, ObjectStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = ObjectStore::open(dir.path().join("objects"));
    (dir, store)
}

#[test]
fn first_advance_yields_seed() {
    let (_dir, store) = temp_store();
    let oids = build_chain(&store, 3);

    let mut walk = Walk::new(&store, *oids.last().unwrap());
    assert!(walk.advance().unwrap());
    assert_eq!(walk.current().unwrap().message, "commit 2\n");
}

#[test]
fn walk_follows_first_parent_to_root() {
    let (_dir, store) = temp_store();
    let oids = build_chain(&store, 5);

    let commits = collect(Walk::new(&store, *oids.last().unwrap())).unwrap();
    assert_eq!(commits.len(), 5);
    // Reverse chronological: newest first.
    for (i, commit) in commits.iter().enumerate() {
        assert_eq!(commit.message, format!("commit {}\n", 4 - i));
    }
    assert!(commits.last().unwrap().is_root());
}

#[test]
fn walk_on_non_commit_errors() {
    let (_dir, store) = temp_store();
    let blob_oid = store.put(&Object::Blob(Blob::new(b"x".to_vec()))).unwrap();

    let mut walk = Walk::new(&store, blob_oid);
    assert!(walk.advance().is_err());
}

#[test]
fn skip_discards_leading_commits() {
    let (_dir, store) = temp_store();
    let oids = build_chain(&store, 5);

    let commits = collect(Skip::new(Walk::new(&store, *oids.last().unwrap()), 2)).unwrap();
    assert_eq!(commits.len(), 3);
    assert_eq!(commits[0].message, "commit 2\n");
}

#[test]
fn take_caps_yielded_commits() {
    let (_dir, store) = temp_store();
    let oids = build_chain(&store, 5);

    let commits = collect(Take::new(Walk::new(&store, *oids.last().unwrap()), 2)).unwrap();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].message, "commit 4\n");
    assert_eq!(commits[1].message, "commit 3\n");
}

#[test]
fn take_after_skip_yields_window() {
    // Ten commits; Take(2) ∘ Skip(2) yields indices 2 and 3 of the
    // reverse-chronological order.
    let (_dir, store) = temp_store();
    let oids = build_chain(&store, 10);

    let cursor = Take::new(Skip::new(Walk::new(&store, *oids.last().unwrap()), 2), 2);
    let commits = collect(cursor).unwrap();

    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].message, "commit 7\n");
    assert_eq!(commits[1].message, "commit 6\n");
}

#[test]
fn take_skip_count_property() {
    // Take(n) ∘ Skip(m) over a chain of length l yields
    // min(n, max(0, l - m)) commits.
    let (_dir, store) = temp_store();
    let len = 6;
    let oids = build_chain(&store, len);
    let seed = *oids.last().unwrap();

    for (skip, take) in [(0, 3), (2, 10), (6, 1), (10, 4), (5, 0)] {
        let cursor = Take::new(Skip::new(Walk::new(&store, seed), skip), take);
        let commits = collect(cursor).unwrap();
        let expected = take.min(len.saturating_sub(skip));
        assert_eq!(
            commits.len(),
            expected,
            "skip={skip} take={take} expected {expected}"
        );
    }
}

#[test]
fn filter_selects_matching_commits() {
    let (_dir, store) = temp_store();
    let oids = build_chain_by(&store, 6, |i| {
        if i % 2 == 0 {
            sig("alice", 1_600_000_000 + i as i64)
        } else {
            sig("bob", 1_600_000_000 + i as i64)
        }
    });

    let cursor = Filter::new(Walk::new(&store, *oids.last().unwrap()), |c: &Commit| {
        c.author.name == "alice"
    });
    let commits = collect(cursor).unwrap();
    assert_eq!(commits.len(), 3);
    assert!(commits.iter().all(|c| c.author.name == "alice"));
}

#[test]
fn log_composition_author_then_window() {
    let (_dir, store) = temp_store();
    let oids = build_chain_by(&store, 8, |i| {
        if i < 4 {
            sig("alice", 1_600_000_000 + i as i64)
        } else {
            sig("bob", 1_600_000_000 + i as i64)
        }
    });

    let options = LogOptions {
        author: Some(Regex::new("alice").unwrap()),
        skip: 1,
        max_count: Some(2),
        ..Default::default()
    };
    let commits = collect(compose_log(&store, *oids.last().unwrap(), options)).unwrap();

    // alice authored commits 0..4; newest-first they are 3,2,1,0.
    // Skipping one and taking two leaves commits 2 and 1.
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].message, "commit 2\n");
    assert_eq!(commits[1].message, "commit 1\n");
}

#[test]
fn log_composition_date_filters() {
    let (_dir, store) = temp_store();
    let oids = build_chain(&store, 10);

    // Timestamps are 1_600_000_000 + i.
    let options = LogOptions {
        after: Some(1_600_000_002),
        before: Some(1_600_000_007),
        ..Default::default()
    };
    let commits = collect(compose_log(&store, *oids.last().unwrap(), options)).unwrap();

    // Strictly between: indices 3..=6, newest first.
    assert_eq!(commits.len(), 4);
    assert_eq!(commits[0].message, "commit 6\n");
    assert_eq!(commits[3].message, "commit 3\n");
}

//! Builders that derive trees and commits.

use std::collections::BTreeMap;

use bstr::BString;
use rgit_hash::ObjectId;
use rgit_utils::date::Signature;

use crate::{Commit, FileMode, Tree, TreeEntry};

/// Accumulates blob entries and named child builders, then finalizes the
/// whole hierarchy bottom-up.
///
/// Subtree OIDs are required before a parent can be hashed, so parents are
/// only encoded once every child has been built.
#[derive(Default)]
pub struct TreeBuilder {
    entries: Vec<TreeEntry>,
    subtrees: BTreeMap<BString, TreeBuilder>,
}

/// The result of [`TreeBuilder::build`]: the root tree plus every subtree,
/// in bottom-up order, ready to be persisted by the caller.
pub struct BuiltTree {
    pub root: Tree,
    pub subtrees: Vec<Tree>,
}

impl BuiltTree {
    /// The identity of the root tree.
    pub fn root_oid(&self) -> ObjectId {
        self.root.compute_oid()
    }

    /// All trees of the hierarchy, children before parents, root last.
    pub fn iter(&self) -> impl Iterator<Item = &Tree> {
        self.subtrees.iter().chain(std::iter::once(&self.root))
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf entry.
    pub fn add_blob(&mut self, oid: ObjectId, name: impl Into<BString>, mode: FileMode) {
        self.entries.push(TreeEntry {
            mode,
            name: name.into(),
            oid,
        });
    }

    /// Attach a fully formed child builder under `name`.
    pub fn add_subtree(&mut self, name: impl Into<BString>, builder: TreeBuilder) {
        self.subtrees.insert(name.into(), builder);
    }

    /// The child builder under `name`, created empty on first use.
    pub fn subtree_mut(&mut self, name: impl Into<BString>) -> &mut TreeBuilder {
        self.subtrees.entry(name.into()).or_default()
    }

    /// Finalize bottom-up and return the built hierarchy.
    pub fn build(self) -> BuiltTree {
        let mut collected = Vec::new();
        let root = self.build_into(&mut collected);
        BuiltTree {
            root,
            subtrees: collected,
        }
    }

    fn build_into(self, collected: &mut Vec<Tree>) -> Tree {
        let mut entries = self.entries;
        for (name, builder) in self.subtrees {
            let child = builder.build_into(collected);
            entries.push(TreeEntry {
                mode: FileMode::Tree,
                name,
                oid: child.compute_oid(),
            });
            collected.push(child);
        }

        let mut tree = Tree { entries };
        tree.sort();
        tree
    }
}

/// Assembles a commit, filling defaults and exposing a single post-fill
/// hook that runs after defaults are in place and before encoding.
pub struct CommitBuilder {
    tree: ObjectId,
    parents: Vec<ObjectId>,
    author: Option<Signature>,
    committer: Option<Signature>,
    message: BString,
    post_fill: Option<Box<dyn FnOnce(&mut Commit)>>,
}

impl CommitBuilder {
    pub fn new(tree: ObjectId) -> Self {
        Self {
            tree,
            parents: Vec::new(),
            author: None,
            committer: None,
            message: BString::from(""),
            post_fill: None,
        }
    }

    /// Append a parent.
    pub fn parent(mut self, oid: ObjectId) -> Self {
        self.parents.push(oid);
        self
    }

    pub fn author(mut self, sig: Signature) -> Self {
        self.author = Some(sig);
        self
    }

    pub fn committer(mut self, sig: Signature) -> Self {
        self.committer = Some(sig);
        self
    }

    pub fn message(mut self, message: impl Into<BString>) -> Self {
        self.message = message.into();
        self
    }

    /// Run `hook` on the commit after defaults are filled, before encoding.
    pub fn post_fill(mut self, hook: impl FnOnce(&mut Commit) + 'static) -> Self {
        self.post_fill = Some(Box::new(hook));
        self
    }

    /// Fill defaults (committer mirrors author; timestamps are "now"),
    /// apply the post-fill hook, and produce the commit.
    pub fn build(self) -> Commit {
        let author = self
            .author
            .unwrap_or_else(|| Signature::now("unknown", "unknown"));
        let committer = self.committer.unwrap_or_else(|| author.clone());

        let mut commit = Commit {
            tree: self.tree,
            parents: self.parents,
            author,
            committer,
            message: self.message,
        };

        if let Some(hook) = self.post_fill {
            hook(&mut commit);
        }

        commit
    }
}

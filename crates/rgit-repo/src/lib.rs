//! Repository composition: layout on disk, discovery, and the orchestration
//! of commits, branches, tags, and notes over the lower layers.

mod branch;
mod config;
mod discover;
mod error;
mod init;
mod notes;
mod snapshot;
mod tag;

pub use branch::Branches;
pub use config::Config;
pub use discover::{discover, is_git_dir, DiscoveredRepo};
pub use error::RepoError;
pub use notes::{Note, Notes, DEFAULT_NOTES_NAMESPACE};
pub use snapshot::Snapshot;
pub use tag::Tags;

use std::path::{Path, PathBuf};

use rgit_hash::ObjectId;
use rgit_index::Index;
use rgit_object::{Commit, CommitBuilder, Object};
use rgit_ref::{RefError, RefStore, Reference};
use rgit_store::ObjectStore;
use rgit_walk::{compose_log, CommitCursor, LogOptions};

/// A repository: the git directory, the object store and ref store rooted
/// in it, and the optional working tree around it.
pub struct Repository {
    git_dir: PathBuf,
    work_dir: Option<PathBuf>,
    store: ObjectStore,
    refs: RefStore,
    config: Config,
}

impl Repository {
    /// Initialize a new repository at `path`.
    pub fn init(path: impl AsRef<Path>, bare: bool) -> Result<Self, RepoError> {
        let discovered = init::init_repository(path.as_ref(), bare)?;
        Self::from_discovered(discovered)
    }

    /// Open the repository containing `path`, walking up parent directories
    /// until a git directory is found.
    pub fn from_existing(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let discovered = discover::discover(path.as_ref())?;
        Self::from_discovered(discovered)
    }

    fn from_discovered(discovered: DiscoveredRepo) -> Result<Self, RepoError> {
        let DiscoveredRepo { git_dir, work_dir } = discovered;
        let store = ObjectStore::open(git_dir.join("objects"));
        let refs = RefStore::new(&git_dir);
        let config = Config::open(git_dir.join("config"))?;
        Ok(Self {
            git_dir,
            work_dir,
            store,
            refs,
            config,
        })
    }

    // --- Accessors ---

    /// The git directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The working tree root (None for bare repositories).
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    pub fn is_bare(&self) -> bool {
        self.work_dir.is_none()
    }

    /// The object store.
    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// The ref store.
    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Branch operations bound to `refs/heads/`.
    pub fn branches(&self) -> Branches<'_> {
        Branches::new(&self.refs)
    }

    /// Tag operations bound to `refs/tags/`.
    pub fn tags(&self) -> Tags<'_> {
        Tags::new(&self.refs, &self.store)
    }

    /// Notes operations bound to `refs/notes/<namespace>`.
    pub fn notes(&self, namespace: &str) -> Notes<'_> {
        Notes::new(&self.refs, &self.store, &self.config, namespace)
    }

    /// The path of the index file.
    pub fn index_path(&self) -> PathBuf {
        self.git_dir.join("index")
    }

    /// Load the index, empty if none has been written yet.
    pub fn load_index(&self) -> Result<Index, RepoError> {
        Ok(Index::load_or_empty(self.index_path())?)
    }

    // --- HEAD ---

    /// The ref stored at `HEAD`.
    pub fn head(&self) -> Result<Reference, RepoError> {
        Ok(self.refs.get("HEAD")?)
    }

    /// Write `HEAD` verbatim: either `ref: <path>` or a 40-char OID.
    pub fn set_head(&self, value: &str) -> Result<Reference, RepoError> {
        Ok(self.refs.set("HEAD", value)?)
    }

    /// Resolve `HEAD` to an OID, or None while it is unborn.
    pub fn head_oid(&self) -> Result<Option<ObjectId>, RepoError> {
        match self.refs.resolve_name("HEAD") {
            Ok(resolved) => Ok(resolved.target_oid()),
            Err(RefError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // --- Operations ---

    /// Create a commit from the current working directory.
    ///
    /// Builds and persists the tree, resolves `HEAD` to the parent commit
    /// (bootstrapping `master` when `HEAD` is unborn), hands the prepared
    /// builder to `configure`, stores the result, and advances the branch
    /// `HEAD` names.
    pub fn commit<F>(&self, configure: F) -> Result<Commit, RepoError>
    where
        F: FnOnce(CommitBuilder) -> CommitBuilder,
    {
        let work_dir = self.work_dir.as_deref().ok_or(RepoError::BareRepository)?;

        let snapshot = Snapshot::capture(work_dir)?;
        let tree_oid = snapshot.persist(&self.store)?;

        let head = self.head()?;
        let (branch, parent) = match self.refs.resolve(&head) {
            Ok(resolved) => (
                resolved.name().as_str().to_string(),
                resolved.target_oid(),
            ),
            Err(RefError::NotFound(_)) => {
                // Unborn HEAD: the commit gets no parent and the branch HEAD
                // names is created afterwards.
                let branch = head
                    .symbolic_target()
                    .map(|t| t.as_str().to_string())
                    .unwrap_or_else(|| "refs/heads/master".to_string());
                (branch, None)
            }
            Err(e) => return Err(e.into()),
        };

        let identity = self.config.identity();
        let mut builder = CommitBuilder::new(tree_oid)
            .author(identity.clone())
            .committer(identity);
        if let Some(parent) = parent {
            builder = builder.parent(parent);
        }

        let commit = configure(builder).build();
        let oid = self.store.put(&Object::Commit(commit.clone()))?;
        self.refs.set_oid(&branch, oid)?;

        Ok(commit)
    }

    /// Walk the commit chain from `HEAD` with the log filters applied.
    pub fn log(&self, options: LogOptions) -> Result<Box<dyn CommitCursor + '_>, RepoError> {
        let head = self
            .head_oid()?
            .ok_or_else(|| RepoError::Ref(RefError::NotFound("HEAD".into())))?;
        Ok(compose_log(&self.store, head, options))
    }
}

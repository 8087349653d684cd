use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use boo_crypto::{FingerprintAlgorithm, TreeHasher};
use boo_types::{FingerprintMap, SnapshotId};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::RepoConfig;
use crate::error::{StoreError, StoreResult};
use crate::fs::atomic_write;
use crate::layout::{Layout, BOO_DIR};
use crate::metadata;

/// A located repository: root directory, layout, and configuration.
///
/// The root is fixed for the lifetime of the value. Nothing is cached
/// between calls; every query goes back to disk.
#[derive(Clone, Debug)]
pub struct RepositoryStore {
    layout: Layout,
    config: RepoConfig,
}

/// Result of scanning the working tree.
///
/// Carries the per-file map and the pending whole-tree fingerprint that a
/// commit finalizes. A commit consumes the scan, so it cannot run on a map
/// computed for a different operation.
#[derive(Debug)]
pub struct WorkingTree {
    files: FingerprintMap,
    tree: TreeHasher,
}

impl WorkingTree {
    pub fn files(&self) -> &FingerprintMap {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_parts(self) -> (FingerprintMap, TreeHasher) {
        (self.files, self.tree)
    }
}

impl RepositoryStore {
    /// Locate the repository that owns the process's current directory.
    pub fn locate() -> StoreResult<Self> {
        let cwd = std::env::current_dir().map_err(StoreError::io(Path::new(".")))?;
        Self::locate_from(&cwd)
    }

    /// Walk upward from `start` (inclusive) to the nearest directory that
    /// contains `.boo`.
    pub fn locate_from(start: &Path) -> StoreResult<Self> {
        let start = absolute(start)?;
        let mut visited = HashSet::new();
        let mut current = Some(start.as_path());

        while let Some(dir) = current {
            if !visited.insert(dir.to_path_buf()) {
                break;
            }
            debug!(dir = %dir.display(), "searching for repository");
            if dir.join(BOO_DIR).is_dir() {
                info!(root = %dir.display(), "found repository");
                return Self::open(dir);
            }
            current = dir.parent();
        }

        Err(StoreError::NotARepository { start })
    }

    /// Create a repository in the process's current directory.
    pub fn initialize() -> StoreResult<Self> {
        let cwd = std::env::current_dir().map_err(StoreError::io(Path::new(".")))?;
        Self::initialize_at(&cwd, RepoConfig::default())
    }

    /// Create `.boo`, an empty journal, and `config.toml` in `dir`.
    pub fn initialize_at(dir: &Path, config: RepoConfig) -> StoreResult<Self> {
        let layout = Layout::new(absolute(dir)?);
        let boo_dir = layout.boo_dir();
        if boo_dir.exists() {
            return Err(StoreError::AlreadyInitialized(boo_dir.to_path_buf()));
        }

        fs::create_dir(boo_dir).map_err(StoreError::io(boo_dir))?;
        let journal = layout.journal_path();
        fs::File::create(&journal).map_err(StoreError::io(&journal))?;
        config.save(&layout.config_path())?;

        info!(root = %layout.root().display(), fingerprint = %config.fingerprint, "initialized repository");
        Ok(Self { layout, config })
    }

    fn open(root: &Path) -> StoreResult<Self> {
        let layout = Layout::new(root);
        let config = RepoConfig::load(&layout.config_path())?;
        Ok(Self { layout, config })
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn algorithm(&self) -> FingerprintAlgorithm {
        self.config.fingerprint
    }

    // ---------------------------------------------------------------
    // Working tree
    // ---------------------------------------------------------------

    /// Fingerprint every regular file under the root, excluding `.boo`.
    ///
    /// Files are visited in path order, so the pending tree fingerprint does
    /// not depend on the platform's directory iteration order. Symlinks are
    /// not followed and not versioned.
    pub fn current_fingerprints(&self) -> StoreResult<WorkingTree> {
        let algorithm = self.algorithm();
        let mut files = FingerprintMap::new();

        for path in self.working_files()? {
            let data = fs::read(&path).map_err(StoreError::io(&path))?;
            let fp = algorithm.fingerprint(&data);
            debug!(path = %path.display(), fingerprint = %fp, "hashed");
            files.insert(path, fp);
        }

        let mut tree = TreeHasher::new(algorithm);
        for (path, fp) in &files {
            tree.add(self.relative_path(path)?.as_path(), fp);
        }

        debug!(files = files.len(), "scanned working tree");
        Ok(WorkingTree { files, tree })
    }

    /// Absolute paths of every versioned file, in path order.
    fn working_files(&self) -> StoreResult<Vec<PathBuf>> {
        let boo_dir = self.layout.boo_dir();
        let mut paths = Vec::new();

        let walker = WalkDir::new(self.root())
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.path() != boo_dir);

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            match path.to_str() {
                Some(s) if !s.contains('\n') => paths.push(path),
                _ => warn!(path = %path.display(), "skipping file whose name cannot be recorded"),
            }
        }

        Ok(paths)
    }

    /// `abs` relative to the repository root.
    pub fn relative_path(&self, abs: &Path) -> StoreResult<PathBuf> {
        abs.strip_prefix(self.root())
            .map(Path::to_path_buf)
            .map_err(|_| StoreError::OutsideRepository(abs.to_path_buf()))
    }

    /// `rel` resolved against the repository root.
    pub fn absolute_path(&self, rel: &Path) -> PathBuf {
        self.root().join(rel)
    }

    // ---------------------------------------------------------------
    // Head
    // ---------------------------------------------------------------

    /// The current head, or `None` before the first commit.
    pub fn head(&self) -> StoreResult<Option<SnapshotId>> {
        let path = self.layout.head_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&path)(e)),
        };
        match text.split_whitespace().next() {
            Some(token) => Ok(Some(token.parse()?)),
            None => Ok(None),
        }
    }

    /// Replace the head file's contents with `id`.
    pub fn set_head(&self, id: &SnapshotId) -> StoreResult<()> {
        atomic_write(
            &self.layout.head_path(),
            id.to_string().as_bytes(),
            self.config.sync_writes,
        )?;
        debug!(head = %id, "head updated");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Snapshots
    // ---------------------------------------------------------------

    /// `true` iff `<id>/` exists and is a directory.
    pub fn exists_commit(&self, id: &SnapshotId) -> bool {
        self.layout.snapshot_dir(id).is_dir()
    }

    /// The path/fingerprint map recorded for `id`. Missing metadata yields an
    /// empty map.
    pub fn parse_metadata(&self, id: &SnapshotId) -> StoreResult<FingerprintMap> {
        let path = self.layout.metadata_path(id);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FingerprintMap::new()),
            Err(e) => return Err(StoreError::io(&path)(e)),
        };
        metadata::decode(&text, &path)
    }

    /// The map recorded at head, empty if there is no head yet.
    pub fn head_metadata(&self) -> StoreResult<FingerprintMap> {
        match self.head()? {
            Some(id) => self.parse_metadata(&id),
            None => Ok(FingerprintMap::new()),
        }
    }

    /// Write metadata records to `path`.
    pub fn write_metadata(&self, path: &Path, files: &FingerprintMap) -> StoreResult<()> {
        atomic_write(path, metadata::encode(files).as_bytes(), self.config.sync_writes)
    }
}

fn absolute(path: &Path) -> StoreResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(StoreError::io(path))?;
    Ok(cwd.join(path))
}

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use boo_diff::{diff, ChangeSet, WorkdirStatus};
use boo_journal::{CommitJournal, JournalEntry};
use boo_store::fs::{copy_file, remove_file_if_exists};
use boo_store::{RepoConfig, RepositoryStore, WorkingTree};
use boo_types::SnapshotId;
use tracing::{debug, info, warn};

use crate::commit::{CommitReceipt, ResetReport};
use crate::error::{SdkError, SdkResult};

/// Records and restores snapshots of one repository's working tree.
///
/// Path resolution is delegated to the [`RepositoryStore`]; this type owns
/// the commit and reset transitions.
pub struct SnapshotManager {
    store: RepositoryStore,
    journal: CommitJournal,
}

impl std::fmt::Debug for SnapshotManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotManager")
            .field("root", &self.store.root())
            .field("fingerprint", &self.store.algorithm())
            .finish()
    }
}

impl SnapshotManager {
    pub fn new(store: RepositoryStore) -> Self {
        let journal = CommitJournal::new(store.layout().journal_path())
            .with_sync(store.config().sync_writes);
        Self { store, journal }
    }

    /// Manager for the repository owning the current directory.
    pub fn locate() -> SdkResult<Self> {
        Ok(Self::new(RepositoryStore::locate()?))
    }

    pub fn locate_from(start: &Path) -> SdkResult<Self> {
        Ok(Self::new(RepositoryStore::locate_from(start)?))
    }

    /// Create a repository in `dir`.
    pub fn initialize_at(dir: &Path, config: RepoConfig) -> SdkResult<Self> {
        Ok(Self::new(RepositoryStore::initialize_at(dir, config)?))
    }

    pub fn store(&self) -> &RepositoryStore {
        &self.store
    }

    // ---- Queries ----

    pub fn head(&self) -> SdkResult<Option<SnapshotId>> {
        Ok(self.store.head()?)
    }

    pub fn exists_commit(&self, id: &SnapshotId) -> bool {
        self.store.exists_commit(id)
    }

    /// Journal records, oldest first.
    pub fn log(&self) -> SdkResult<Vec<JournalEntry>> {
        Ok(self.journal.parse_all()?)
    }

    /// Working tree changes relative to head.
    pub fn status(&self) -> SdkResult<WorkdirStatus> {
        let head = self.store.head()?;
        let recorded = match &head {
            Some(id) => self.store.parse_metadata(id)?,
            None => Default::default(),
        };
        let current = self.store.current_fingerprints()?;
        Ok(WorkdirStatus::new(head, diff(&recorded, current.files())))
    }

    /// Resolve a full id, or a unique prefix of a journaled id, to a snapshot
    /// that exists on disk.
    pub fn resolve(&self, text: &str) -> SdkResult<SnapshotId> {
        let text = text.trim();
        if let Ok(id) = text.parse::<SnapshotId>() {
            if self.exists_commit(&id) {
                return Ok(id);
            }
        }

        let mut matches: Vec<SnapshotId> = self
            .log()?
            .into_iter()
            .map(|entry| entry.id)
            .filter(|id| !text.is_empty() && id.to_string().starts_with(text))
            .filter(|id| self.exists_commit(id))
            .collect();
        matches.sort();
        matches.dedup();

        match matches.len() {
            0 => Err(SdkError::UnknownCommit(text.to_string())),
            1 => Ok(matches[0]),
            n => Err(SdkError::AmbiguousCommit {
                prefix: text.to_string(),
                matches: n,
            }),
        }
    }

    // ---- Commit ----

    /// Scan the working tree and commit it.
    pub fn commit(&self, message: &str) -> SdkResult<CommitReceipt> {
        let tree = self.store.current_fingerprints()?;
        self.commit_scan(tree, message)
    }

    /// Commit a working tree scanned by [`RepositoryStore::current_fingerprints`].
    ///
    /// The copy is staged under `.boo` and published by renaming the staging
    /// directory to `<id>/`. If anything fails before that rename, no trace
    /// of the attempt remains. The journal entry and head follow the publish.
    pub fn commit_scan(&self, tree: WorkingTree, message: &str) -> SdkResult<CommitReceipt> {
        let layout = self.store.layout();
        let (files, hasher) = tree.into_parts();
        let algorithm = hasher.algorithm();
        let id = hasher.finish(&time_nonce());

        let snapshot_dir = layout.snapshot_dir(&id);
        if snapshot_dir.exists() {
            return Err(SdkError::SnapshotExists(id));
        }

        // Dropping `staging` removes it, so every early return below cleans up.
        let staging = tempfile::Builder::new()
            .prefix(layout.staging_prefix())
            .tempdir_in(layout.boo_dir())
            .map_err(|source| SdkError::Io {
                path: layout.boo_dir().to_path_buf(),
                source,
            })?;

        for path in files.keys() {
            let relative = self.store.relative_path(path)?;
            copy_file(path, &staging.path().join(relative))?;
        }

        let metadata_path = layout.metadata_path(&id);
        self.store.write_metadata(&metadata_path, &files)?;

        if let Err(source) = fs::rename(staging.path(), &snapshot_dir) {
            if let Err(e) = remove_file_if_exists(&metadata_path) {
                warn!(error = %e, "failed to remove unpublished metadata");
            }
            return Err(SdkError::Io {
                path: snapshot_dir,
                source,
            });
        }
        debug!(%id, %algorithm, files = files.len(), "snapshot published");

        self.journal.append(&id, message)?;
        self.store.set_head(&id)?;

        info!(%id, files = files.len(), "committed");
        Ok(CommitReceipt {
            id,
            message: message.to_string(),
            files,
        })
    }

    // ---- Reset ----

    /// Restore the working tree to snapshot `id` and move head there.
    ///
    /// Unless `force` is set, refuses when the working tree differs from the
    /// snapshot at head, so uncommitted work is never discarded silently.
    pub fn reset(&self, id: &SnapshotId, force: bool) -> SdkResult<ResetReport> {
        if !self.exists_commit(id) {
            return Err(SdkError::CommitNotFound(*id));
        }

        let current = self.store.current_fingerprints()?;

        if !force {
            let recorded = self.store.head_metadata()?;
            let pending = diff(&recorded, current.files());
            if !pending.is_empty() {
                return Err(SdkError::DirtyWorkingTree { changes: pending });
            }
        }

        let target = self.store.parse_metadata(id)?;
        let changes = diff(current.files(), &target);
        self.apply(id, &changes)?;

        self.store.set_head(id)?;
        info!(%id, changed = changes.len(), force, "reset");
        Ok(ResetReport { id: *id, changes })
    }

    /// Rewrite every changed path: remove the working copy, then restore the
    /// snapshot copy if the snapshot has one.
    fn apply(&self, id: &SnapshotId, changes: &ChangeSet) -> SdkResult<()> {
        let snapshot_dir = self.store.layout().snapshot_dir(id);
        let paths = changes.paths();

        // Deepest first, so a directory emptied here is gone before a file
        // of the same name is restored.
        for path in paths.iter().rev() {
            if remove_file_if_exists(path)? {
                debug!(path = %path.display(), "removed");
            }
            self.prune_empty_parents(path);
        }

        for path in &paths {
            if changes.removed.contains(*path) {
                continue;
            }
            let source = snapshot_dir.join(self.store.relative_path(path)?);
            if source.is_file() {
                copy_file(&source, path)?;
            } else {
                warn!(path = %path.display(), "snapshot copy missing; left absent");
            }
        }

        Ok(())
    }

    /// Remove directories left empty by a removal, stopping at the root.
    fn prune_empty_parents(&self, path: &Path) {
        let root = self.store.root();
        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == root || !d.starts_with(root) {
                break;
            }
            // Fails on non-empty directories, which ends the climb.
            if fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }
}

fn time_nonce() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use boo_crypto::FingerprintAlgorithm;
    use boo_types::Fingerprint;
    use std::path::PathBuf;

    fn init(dir: &Path) -> SnapshotManager {
        SnapshotManager::initialize_at(dir, RepoConfig::default()).unwrap()
    }

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn staging_leftovers(manager: &SnapshotManager) -> usize {
        fs::read_dir(manager.store().layout().boo_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".staging-"))
            .count()
    }

    #[test]
    fn commit_persists_snapshot_metadata_journal_and_head() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "a.txt", "hello");
        write(dir.path(), "src/lib.rs", "fn main() {}");

        let receipt = boo.commit("first").unwrap();
        let layout = boo.store().layout();

        assert!(boo.exists_commit(&receipt.id));
        assert_eq!(
            fs::read_to_string(layout.snapshot_dir(&receipt.id).join("src/lib.rs")).unwrap(),
            "fn main() {}"
        );
        assert_eq!(boo.store().parse_metadata(&receipt.id).unwrap(), receipt.files);
        assert_eq!(receipt.files.len(), 2);
        assert_eq!(boo.head().unwrap(), Some(receipt.id));
        assert_eq!(boo.log().unwrap(), vec![JournalEntry::new(receipt.id, "first")]);
        assert_eq!(staging_leftovers(&boo), 0);
    }

    #[test]
    fn snapshot_excludes_boo_dir() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "a.txt", "hello");
        let receipt = boo.commit("first").unwrap();
        let snapshot = boo.store().layout().snapshot_dir(&receipt.id);
        assert!(!snapshot.join(".boo").exists());
    }

    #[test]
    fn repeat_commit_of_unchanged_tree_gets_fresh_id() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "a.txt", "hello");
        let first = boo.commit("one").unwrap();
        let second = boo.commit("two").unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.files, second.files);
        assert_eq!(boo.log().unwrap().len(), 2);
    }

    #[test]
    fn commit_of_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        let receipt = boo.commit("empty").unwrap();
        assert!(receipt.files.is_empty());
        assert!(boo.exists_commit(&receipt.id));
    }

    #[test]
    fn commit_with_legacy_fingerprints() {
        let dir = tempfile::tempdir().unwrap();
        let config = RepoConfig {
            fingerprint: FingerprintAlgorithm::Legacy,
            ..RepoConfig::default()
        };
        let boo = SnapshotManager::initialize_at(dir.path(), config).unwrap();
        let a = write(dir.path(), "a.txt", "hello");
        let receipt = boo.commit("legacy").unwrap();
        assert!(receipt.id.is_legacy());
        assert_eq!(receipt.files[&a], Fingerprint::Legacy(17546024129407874841));
    }

    #[test]
    fn failed_commit_leaves_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "a.txt", "hello");
        let tree = boo.store().current_fingerprints().unwrap();
        // The file vanishes between scan and copy.
        fs::remove_file(dir.path().join("a.txt")).unwrap();

        assert!(boo.commit_scan(tree, "broken").is_err());
        assert_eq!(staging_leftovers(&boo), 0);
        assert!(boo.log().unwrap().is_empty());
        assert_eq!(boo.head().unwrap(), None);
        let leftovers: Vec<_> = fs::read_dir(boo.store().layout().boo_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("meta"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn exists_commit_false_for_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "a.txt", "hello");
        boo.commit("first").unwrap();
        assert!(!boo.exists_commit(&Fingerprint::Blake3([0xee; 32])));
        assert!(!boo.exists_commit(&Fingerprint::Legacy(1)));
    }

    #[test]
    fn reset_unknown_commit_fails() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        let err = boo.reset(&Fingerprint::Legacy(9), true).unwrap_err();
        assert!(matches!(err, SdkError::CommitNotFound(_)));
    }

    #[test]
    fn reset_to_head_without_changes_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "a.txt", "hello");
        write(dir.path(), "d/b.txt", "bee");
        let receipt = boo.commit("msg").unwrap();

        let report = boo.reset(&receipt.id, false).unwrap();
        assert!(report.changes.is_empty());
        let now = boo.store().current_fingerprints().unwrap();
        assert_eq!(now.files(), &receipt.files);
    }

    #[test]
    fn non_forced_reset_refuses_each_kind_of_change() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "a.txt", "hello");
        write(dir.path(), "b.txt", "keep");
        let receipt = boo.commit("base").unwrap();

        // modified
        write(dir.path(), "a.txt", "changed");
        let err = boo.reset(&receipt.id, false).unwrap_err();
        match err {
            SdkError::DirtyWorkingTree { changes } => {
                assert_eq!(changes.modified.len(), 1);
            }
            other => panic!("expected DirtyWorkingTree, got {other:?}"),
        }
        write(dir.path(), "a.txt", "hello");

        // added
        write(dir.path(), "new.txt", "new");
        assert!(matches!(
            boo.reset(&receipt.id, false),
            Err(SdkError::DirtyWorkingTree { .. })
        ));
        fs::remove_file(dir.path().join("new.txt")).unwrap();

        // removed
        fs::remove_file(dir.path().join("b.txt")).unwrap();
        assert!(matches!(
            boo.reset(&receipt.id, false),
            Err(SdkError::DirtyWorkingTree { .. })
        ));

        // forced reset skips the check and restores the file
        boo.reset(&receipt.id, true).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "keep");
    }

    #[test]
    fn non_forced_reset_before_any_commit_with_files_is_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "a.txt", "hello");
        let receipt = boo.commit("first").unwrap();
        // Head is dropped, as in a repository whose head file was never written.
        fs::remove_file(boo.store().layout().head_path()).unwrap();
        assert!(matches!(
            boo.reset(&receipt.id, false),
            Err(SdkError::DirtyWorkingTree { .. })
        ));
    }

    #[test]
    fn reset_restores_target_file_set() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "keep.txt", "same");
        write(dir.path(), "edit.txt", "v1");
        write(dir.path(), "gone/later.txt", "old");
        let first = boo.commit("first").unwrap();

        write(dir.path(), "edit.txt", "v2");
        fs::remove_dir_all(dir.path().join("gone")).unwrap();
        write(dir.path(), "extra/new.txt", "new");
        let second = boo.commit("second").unwrap();

        let report = boo.reset(&first.id, false).unwrap();
        assert_eq!(report.changes.len(), 3);
        assert_eq!(fs::read_to_string(dir.path().join("edit.txt")).unwrap(), "v1");
        assert_eq!(
            fs::read_to_string(dir.path().join("gone/later.txt")).unwrap(),
            "old"
        );
        assert!(!dir.path().join("extra/new.txt").exists());
        assert!(!dir.path().join("extra").exists());
        assert_eq!(boo.head().unwrap(), Some(first.id));
        assert_eq!(boo.store().current_fingerprints().unwrap().files(), &first.files);

        // and forward again
        boo.reset(&second.id, false).unwrap();
        assert_eq!(boo.store().current_fingerprints().unwrap().files(), &second.files);
    }

    #[test]
    fn reset_replaces_directory_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "node", "file");
        let first = boo.commit("file").unwrap();

        fs::remove_file(dir.path().join("node")).unwrap();
        write(dir.path(), "node/child.txt", "nested");
        boo.commit("dir").unwrap();

        boo.reset(&first.id, false).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("node")).unwrap(), "file");
    }

    #[test]
    fn reset_replaces_file_with_directory() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "node/child.txt", "nested");
        let first = boo.commit("dir").unwrap();

        fs::remove_dir_all(dir.path().join("node")).unwrap();
        write(dir.path(), "node", "file");
        boo.commit("file").unwrap();

        let report = boo.reset(&first.id, false).unwrap();
        assert_eq!(report.changes.len(), 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("node/child.txt")).unwrap(),
            "nested"
        );
        assert_eq!(boo.store().current_fingerprints().unwrap().files(), &first.files);
    }

    #[test]
    fn status_against_empty_repository() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        let a = write(dir.path(), "a.txt", "hello");
        let status = boo.status().unwrap();
        assert!(status.head.is_none());
        assert!(status.changes.added.contains(&a));
    }

    #[test]
    fn resolve_accepts_full_id_and_unique_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "a.txt", "hello");
        let receipt = boo.commit("first").unwrap();
        let full = receipt.id.to_string();

        assert_eq!(boo.resolve(&full).unwrap(), receipt.id);
        assert_eq!(boo.resolve(&full[..10]).unwrap(), receipt.id);
        assert!(matches!(boo.resolve("zzz"), Err(SdkError::UnknownCommit(_))));
        assert!(matches!(boo.resolve(""), Err(SdkError::UnknownCommit(_))));
    }

    #[test]
    fn locate_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path());
        let nested = dir.path().join("x/y");
        fs::create_dir_all(&nested).unwrap();
        let boo = SnapshotManager::locate_from(&nested).unwrap();
        assert_eq!(boo.store().root(), dir.path());
    }

    #[test]
    fn store_errors_map_to_taxonomy() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SnapshotManager::locate_from(dir.path()),
            Err(SdkError::NotARepository(_))
        ));
        init(dir.path());
        assert!(matches!(
            SnapshotManager::initialize_at(dir.path(), RepoConfig::default()),
            Err(SdkError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn commit_after_torn_journal_tail_keeps_log_readable() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        write(dir.path(), "a.txt", "hello");
        let first = boo.commit("first").unwrap();
        let mut log = fs::OpenOptions::new()
            .append(true)
            .open(boo.store().layout().journal_path())
            .unwrap();
        std::io::Write::write_all(&mut log, b"123\n50\ntorn").unwrap();
        drop(log);

        let second = boo.commit("second").unwrap();
        let ids: Vec<_> = boo.log().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(boo.resolve(&second.id.to_string()[..12]).unwrap(), second.id);
    }

    #[test]
    fn end_to_end_hello_world() {
        let dir = tempfile::tempdir().unwrap();
        let boo = init(dir.path());
        let a = write(dir.path(), "a.txt", "hello");
        let first = boo.commit("first").unwrap();

        write(dir.path(), "a.txt", "world");
        let status = boo.status().unwrap();
        assert_eq!(status.head, Some(first.id));
        assert_eq!(status.changes.modified.iter().collect::<Vec<_>>(), vec![&a]);
        assert!(status.changes.added.is_empty());
        assert!(status.changes.removed.is_empty());

        boo.reset(&first.id, true).unwrap();
        assert_eq!(fs::read_to_string(&a).unwrap(), "hello");
        assert!(boo.status().unwrap().is_clean());
    }
}

//! Shared equivalence store for one migration run.
//!
//! Wraps [`MemoryDb`] behind a read/write lock so orchestration threads can
//! record and query concurrently. A file-backed store writes each new record
//! through [`mutate_db_file`], so records other processes added to the file
//! in the meantime are kept and become visible here as well.

use crate::equivalence::{RepositoryEquivalence, SubmittedMigration};
use crate::file::DbError;
use crate::lock::mutate_db_file;
use crate::memory::MemoryDb;
use crate::revision::Revision;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct EquivalenceStore {
    path: Option<PathBuf>,
    state: RwLock<MemoryDb>,
}

impl EquivalenceStore {
    /// A store that lives only for this process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the db file at `path`. A missing file starts empty and is
    /// created on the first change.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DbError> {
        let path = path.into();
        let db = MemoryDb::load(&path)?;
        debug!(
            path = %path.display(),
            equivalences = db.equivalences().count(),
            "opened equivalence db"
        );
        Ok(Self {
            path: Some(path),
            state: RwLock::new(db),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record an equivalence. Recording one that is already known is a
    /// no-op and does not touch the file.
    pub fn record(&self, equivalence: RepositoryEquivalence) -> Result<(), DbError> {
        let mut state = self.state.write();
        if state.contains_equivalence(&equivalence) {
            debug!(%equivalence, "equivalence already recorded");
            return Ok(());
        }
        self.apply(&mut state, |db| db.record_equivalence(equivalence.clone()))?;
        info!(%equivalence, "recorded equivalence");
        Ok(())
    }

    /// Revisions in `other_repository` known to be equivalent to `revision`.
    pub fn find(&self, revision: &Revision, other_repository: &str) -> BTreeSet<Revision> {
        self.state.read().find_equivalences(revision, other_repository)
    }

    /// Record a submitted migration. Idempotent like [`Self::record`].
    pub fn record_migration(&self, migration: SubmittedMigration) -> Result<(), DbError> {
        let mut state = self.state.write();
        if state.contains_migration(&migration) {
            return Ok(());
        }
        self.apply(&mut state, |db| db.record_migration(migration.clone()))?;
        info!(
            from = %migration.from_revision,
            to = %migration.to_revision,
            "recorded submitted migration"
        );
        Ok(())
    }

    pub fn find_migration(&self, from_revision: &Revision) -> Option<SubmittedMigration> {
        self.state.read().find_migration(from_revision).cloned()
    }

    /// A consistent copy of the current state.
    pub fn snapshot(&self) -> MemoryDb {
        self.state.read().clone()
    }

    /// Re-read the backing file, keeping records only this store knows.
    pub fn reload(&self) -> Result<(), DbError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let on_disk = MemoryDb::load(path)?;
        self.state.write().merge(&on_disk);
        Ok(())
    }

    /// Merge the current state into the backing file, if any.
    pub fn save(&self) -> Result<(), DbError> {
        let mut state = self.state.write();
        let ours = state.clone();
        self.apply(&mut state, |db| db.merge(&ours))
    }

    /// Apply `change` to the file under its lock and adopt the result, or
    /// to the in-memory state when there is no file. The state is left
    /// untouched if the file could not be updated.
    fn apply(
        &self,
        state: &mut MemoryDb,
        change: impl FnOnce(&mut MemoryDb) -> bool,
    ) -> Result<(), DbError> {
        match &self.path {
            Some(path) => {
                let (_, on_disk) = mutate_db_file(path, change)?;
                state.merge(&on_disk);
            }
            None => {
                change(state);
            }
        }
        Ok(())
    }
}

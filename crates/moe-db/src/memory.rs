//! Canonical in-memory db state.
//!
//! Equivalences and submitted migrations live in sorted sets: duplicate
//! records collapse on insert and iteration order is deterministic, which
//! keeps the persisted file stable across runs.

use crate::equivalence::{RepositoryEquivalence, SubmittedMigration};
use crate::file::{DbError, DbFile, read_db_from_path, write_db_to_path};
use crate::revision::Revision;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDb {
    equivalences: BTreeSet<RepositoryEquivalence>,
    migrations: BTreeSet<SubmittedMigration>,
}

impl MemoryDb {
    pub fn from_file(file: DbFile) -> Self {
        Self {
            equivalences: file.equivalences.into_iter().collect(),
            migrations: file.migrations.into_iter().collect(),
        }
    }

    /// Sorted file representation.
    pub fn to_file(&self) -> DbFile {
        DbFile {
            equivalences: self.equivalences.iter().cloned().collect(),
            migrations: self.migrations.iter().cloned().collect(),
        }
    }

    /// Load from a db file. A missing file is an empty db.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(Self::from_file(read_db_from_path(path)?))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DbError> {
        write_db_to_path(path, &self.to_file())
    }

    /// Record an equivalence. Returns false when it was already present.
    pub fn record_equivalence(&mut self, equivalence: RepositoryEquivalence) -> bool {
        self.equivalences.insert(equivalence)
    }

    /// Revisions in `other_repository` known to be equivalent to `revision`.
    pub fn find_equivalences(&self, revision: &Revision, other_repository: &str) -> BTreeSet<Revision> {
        self.equivalences
            .iter()
            .filter_map(|eq| eq.other_revision(revision))
            .filter(|other| other.repository_name == other_repository)
            .cloned()
            .collect()
    }

    /// Record a submitted migration. Returns false when it was already present.
    pub fn record_migration(&mut self, migration: SubmittedMigration) -> bool {
        self.migrations.insert(migration)
    }

    /// The submitted migration of `from_revision`, if any.
    pub fn find_migration(&self, from_revision: &Revision) -> Option<&SubmittedMigration> {
        self.migrations
            .iter()
            .find(|migration| &migration.from_revision == from_revision)
    }

    pub fn contains_equivalence(&self, equivalence: &RepositoryEquivalence) -> bool {
        self.equivalences.contains(equivalence)
    }

    pub fn contains_migration(&self, migration: &SubmittedMigration) -> bool {
        self.migrations.contains(migration)
    }

    /// Add every record of `other`. Returns true when anything was new.
    pub fn merge(&mut self, other: &MemoryDb) -> bool {
        let before = (self.equivalences.len(), self.migrations.len());
        self.equivalences.extend(other.equivalences.iter().cloned());
        self.migrations.extend(other.migrations.iter().cloned());
        before != (self.equivalences.len(), self.migrations.len())
    }

    pub fn equivalences(&self) -> impl Iterator<Item = &RepositoryEquivalence> {
        self.equivalences.iter()
    }

    pub fn migrations(&self) -> impl Iterator<Item = &SubmittedMigration> {
        self.migrations.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.equivalences.is_empty() && self.migrations.is_empty()
    }
}

//! # moe-db
//!
//! Revision facts and the durable record of migrations between repositories.
//!
//! This crate provides:
//! - `Revision` and `RevisionMetadata`, plus metadata concatenation for
//!   squashed migrations and the provenance footer contract
//! - `RepositoryEquivalence` and `SubmittedMigration` records
//! - `MemoryDb` (canonical in-memory state) and its JSON db file
//! - `DbLock` and `mutate_db_file`, the locked load, change and save cycle
//!   every writer of a db file goes through
//! - `EquivalenceStore` (lock-guarded, write-through shared store)
//!
//! It does not search history for new equivalences. Callers record them
//! once a migration completes.
//!
//! ## Data model
//!
//! ```text
//! db.json (on disk, sorted, pretty-printed)
//!     ↕  mutate_db_file (db.json.lock held, atomic replace)
//! MemoryDb (sorted sets)
//!     ↕  RwLock
//! EquivalenceStore (shared across threads)
//! ```

pub mod equivalence;
pub mod file;
pub mod lock;
pub mod memory;
pub mod metadata;
pub mod revision;
pub mod store;

pub use equivalence::{RepositoryEquivalence, SubmittedMigration};
pub use file::{DbError, DbFile, parse_db, read_db_from_path, render_db, write_db_to_path};
pub use lock::{DbLock, LOCK_WAIT, db_lock_path, mutate_db_file};
pub use memory::MemoryDb;
pub use metadata::{
    DESCRIPTION_SEPARATOR, FIELD_SEPARATOR, MOE_MIGRATED_REVID_KEY, MOE_MIGRATION_MARKER,
    MetadataError, RevisionMetadata, concatenate, migrated_rev_id, provenance_footer,
};
pub use revision::Revision;
pub use store::EquivalenceStore;

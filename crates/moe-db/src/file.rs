//! Db file storage: one pretty-printed JSON document.
//!
//! The file is meant to be checked into version control, so writes are
//! sorted and byte-stable for the same logical content. A write stages the
//! new text next to the db and renames it into place; readers see either
//! the old or the new document, never a mix.

use crate::equivalence::{RepositoryEquivalence, SubmittedMigration};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// On-disk db document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbFile {
    #[serde(default)]
    pub equivalences: Vec<RepositoryEquivalence>,
    #[serde(default)]
    pub migrations: Vec<SubmittedMigration>,
}

/// Errors from db file operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("corrupted db file: {0}")]
    Corrupt(String),

    #[error("db {db_path} is locked by another writer ({lock_path})")]
    LockBusy { db_path: String, lock_path: String },
}

pub(crate) fn io_error(path: &Path, err: impl Display) -> DbError {
    DbError::Io(format!("{}: {err}", path.display()))
}

/// Render the canonical text of a db document.
pub fn render_db(file: &DbFile) -> Result<String, DbError> {
    let mut text =
        serde_json::to_string_pretty(file).map_err(|e| DbError::Serialize(e.to_string()))?;
    text.push('\n');
    Ok(text)
}

/// Parse db text. Blank input is an empty db.
pub fn parse_db(text: &str) -> Result<DbFile, DbError> {
    if text.trim().is_empty() {
        return Ok(DbFile::default());
    }
    serde_json::from_str(text).map_err(|e| DbError::Parse(e.to_string()))
}

pub fn read_db_from_path(path: impl AsRef<Path>) -> Result<DbFile, DbError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    let text = db_text(&bytes)
        .map_err(|reason| DbError::Corrupt(format!("{}: {reason}", path.display())))?;
    parse_db(text).map_err(|err| match err {
        DbError::Parse(message) => DbError::Parse(format!("{}: {message}", path.display())),
        other => other,
    })
}

/// The db is UTF-8 JSON. A NUL byte or a broken sequence means the file
/// was truncated or written by something else.
fn db_text(bytes: &[u8]) -> Result<&str, String> {
    if let Some(offset) = bytes.iter().position(|&b| b == 0) {
        return Err(format!("NUL byte at offset {offset}"));
    }
    std::str::from_utf8(bytes)
        .map_err(|e| format!("non-UTF-8 byte sequence at offset {}", e.valid_up_to()))
}

/// Replace the db file at `path` with `file`.
pub fn write_db_to_path(path: impl AsRef<Path>, file: &DbFile) -> Result<(), DbError> {
    let path = path.as_ref();
    let text = render_db(file)?;
    if let Some(dir) = parent_dir(path) {
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    }
    StagedDb::next_to(path).commit(path, text.as_bytes())
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|dir| !dir.as_os_str().is_empty())
}

/// Sibling file holding the next db text. Removed on drop unless it was
/// renamed over the db.
struct StagedDb {
    path: PathBuf,
    committed: bool,
}

impl StagedDb {
    fn next_to(target: &Path) -> Self {
        static SEQUENCE: AtomicU64 = AtomicU64::new(0);
        let name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "db".to_string());
        let path = target.with_file_name(format!(
            ".{name}.{}-{}.staged",
            std::process::id(),
            SEQUENCE.fetch_add(1, Ordering::Relaxed)
        ));
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self, target: &Path, bytes: &[u8]) -> Result<(), DbError> {
        let mut staged = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|e| io_error(&self.path, e))?;
        staged
            .write_all(bytes)
            .and_then(|()| staged.sync_all())
            .map_err(|e| io_error(&self.path, e))?;
        drop(staged);

        fs::rename(&self.path, target).map_err(|e| io_error(target, e))?;
        self.committed = true;

        match parent_dir(target) {
            Some(dir) => File::open(dir)
                .and_then(|handle| handle.sync_all())
                .map_err(|e| io_error(dir, e)),
            None => Ok(()),
        }
    }
}

impl Drop for StagedDb {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

//! Cross-process exclusion for a db file.
//!
//! Every writer holds `<db>.lock`, created exclusively, for its whole
//! load, change and save cycle. Two writers therefore merge their records
//! instead of the later one replacing the earlier one's file. The lock file
//! names the process that holds it.

use crate::file::{DbError, io_error};
use crate::memory::MemoryDb;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long a writer waits for another writer to finish.
pub const LOCK_WAIT: Duration = Duration::from_secs(5);

const LOCK_POLL: Duration = Duration::from_millis(10);

/// Lock file guarding the db at `db_path`.
pub fn db_lock_path(db_path: &Path) -> PathBuf {
    let mut name = OsString::from(db_path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LockHolder {
    pid: u32,
    acquired_at: DateTime<Utc>,
}

/// Exclusive hold on a db file. Released on drop.
#[derive(Debug)]
pub struct DbLock {
    lock_path: PathBuf,
}

impl DbLock {
    /// Take the lock for `db_path`, retrying until `wait` has passed.
    pub fn acquire(db_path: &Path, wait: Duration) -> Result<Self, DbError> {
        let lock_path = db_lock_path(db_path);
        if let Some(dir) = lock_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
        }

        let deadline = Instant::now() + wait;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&lock_path) {
                Ok(mut file) => {
                    let holder = LockHolder {
                        pid: std::process::id(),
                        acquired_at: Utc::now(),
                    };
                    if let Err(err) = serde_json::to_writer(&mut file, &holder) {
                        warn!(lock = %lock_path.display(), %err, "could not record lock holder");
                    }
                    debug!(lock = %lock_path.display(), "acquired db lock");
                    return Ok(Self { lock_path });
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(DbError::LockBusy {
                            db_path: db_path.display().to_string(),
                            lock_path: lock_path.display().to_string(),
                        });
                    }
                    thread::sleep(LOCK_POLL);
                }
                Err(err) => return Err(io_error(&lock_path, err)),
            }
        }
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for DbLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// Load the db at `path` under its lock and apply `change` to it.
///
/// The file is rewritten only when `change` altered the db. Returns the
/// value `change` produced together with the db as it now stands on disk.
pub fn mutate_db_file<T>(
    path: impl AsRef<Path>,
    change: impl FnOnce(&mut MemoryDb) -> T,
) -> Result<(T, MemoryDb), DbError> {
    let path = path.as_ref();
    let _lock = DbLock::acquire(path, LOCK_WAIT)?;

    let mut db = MemoryDb::load(path)?;
    let before = db.clone();
    let value = change(&mut db);
    if db != before {
        db.save(path)?;
        debug!(path = %path.display(), "wrote db");
    }
    Ok((value, db))
}

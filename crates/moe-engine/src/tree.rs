//! Content digests of file trees.
//!
//! Two trees with the same digest hold the same files with the same bytes
//! and executable bits. Directory entries without files do not contribute.

use crate::error::CodebaseCreationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// SHA-256 over a tree's sorted file listing and contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeDigest(pub String);

impl fmt::Display for TreeDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Digest the tree rooted at `root`.
pub fn tree_digest(root: &Path) -> Result<TreeDigest, CodebaseCreationError> {
    let mut files = Vec::new();
    collect_files(root, PathBuf::new(), &mut files)?;
    files.sort();

    let mut hasher = Sha256::new();
    for relative in &files {
        let full = root.join(relative);
        let metadata = fs::symlink_metadata(&full).map_err(|e| CodebaseCreationError::io(&full, e))?;
        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update(b"\0");
        if metadata.file_type().is_symlink() {
            let target = fs::read_link(&full).map_err(|e| CodebaseCreationError::io(&full, e))?;
            hasher.update(b"link:");
            hasher.update(target.to_string_lossy().as_bytes());
        } else {
            let bytes = fs::read(&full).map_err(|e| CodebaseCreationError::io(&full, e))?;
            hasher.update(if is_executable(&metadata) { b"x:" } else { b"f:" });
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(&bytes);
        }
        hasher.update(b"\n");
    }

    Ok(TreeDigest(format!("{:x}", hasher.finalize())))
}

fn collect_files(
    root: &Path,
    relative: PathBuf,
    out: &mut Vec<PathBuf>,
) -> Result<(), CodebaseCreationError> {
    let dir = root.join(&relative);
    let entries = fs::read_dir(&dir).map_err(|e| CodebaseCreationError::io(&dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CodebaseCreationError::io(&dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| CodebaseCreationError::io(&entry.path(), e))?;
        let child = relative.join(entry.file_name());
        if file_type.is_dir() {
            collect_files(root, child, out)?;
        } else {
            out.push(child);
        }
    }
    Ok(())
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

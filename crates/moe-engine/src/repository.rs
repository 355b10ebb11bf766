//! Repositories as seen by the engine.
//!
//! VCS adapters live outside this crate. The engine only needs a way to
//! materialize a tree for a repository reference; it tags the result with
//! the repository's project space and the expression itself.

use crate::error::CodebaseCreationError;
use moe_kernel::{Options, REVISION_OPTION};
use std::path::{Component, Path, PathBuf};

pub trait Repository: Send + Sync {
    fn name(&self) -> &str;

    /// Project space every checkout of this repository lives in.
    fn project_space(&self) -> &str;

    /// Materialize a tree for the reference options (`revision`, ...).
    fn check_out(&self, options: &Options) -> Result<PathBuf, CodebaseCreationError>;
}

/// A repository backed by a plain directory.
///
/// Without a `revision` option the directory itself is the checkout. With
/// one, `<root>/<revision>` is, which lets a directory of snapshots stand
/// in for history. A revision must name a path below the root: absolute
/// paths, `..` and anything that resolves outside the root are rejected.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    name: String,
    project_space: String,
    root: PathBuf,
}

impl DirectoryRepository {
    pub fn new(
        name: impl Into<String>,
        project_space: impl Into<String>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            project_space: project_space.into(),
            root: root.into(),
        }
    }
}

impl Repository for DirectoryRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn project_space(&self) -> &str {
        &self.project_space
    }

    fn check_out(&self, options: &Options) -> Result<PathBuf, CodebaseCreationError> {
        let path = match options.get(REVISION_OPTION) {
            Some(revision) => self.snapshot_path(revision)?,
            None => self.root.clone(),
        };
        if !path.is_dir() {
            return Err(self.check_out_error(format!("not a directory: {}", path.display())));
        }
        Ok(path)
    }
}

impl DirectoryRepository {
    fn snapshot_path(&self, revision: &str) -> Result<PathBuf, CodebaseCreationError> {
        let relative = Path::new(revision);
        let below_root = !revision.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !below_root {
            return Err(self.check_out_error(format!(
                "revision {revision:?} does not name a snapshot below {}",
                self.root.display()
            )));
        }

        let path = self.root.join(relative);
        // Symlinked snapshots must still land inside the root.
        if let (Ok(root), Ok(resolved)) = (self.root.canonicalize(), path.canonicalize())
            && !resolved.starts_with(&root)
        {
            return Err(self.check_out_error(format!(
                "revision {revision:?} resolves outside {}",
                self.root.display()
            )));
        }
        Ok(path)
    }

    fn check_out_error(&self, message: String) -> CodebaseCreationError {
        CodebaseCreationError::CheckOut {
            repository: self.name.clone(),
            message,
        }
    }
}

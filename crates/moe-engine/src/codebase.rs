//! Codebases: file trees tagged with where they came from.

use crate::error::CodebaseCreationError;
use crate::tree::{TreeDigest, tree_digest};
use moe_kernel::Expression;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Whether the step that produced a codebase allocated a new tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeStatus {
    /// New content that the caller must persist.
    Modified,

    /// Content identical to the step's input; persisting it can be skipped.
    Unmodified,
}

/// An immutable snapshot of a file tree, its project space, and the
/// expression that produced it.
///
/// The tree itself is owned by whoever allocated it. `with_*` copies share
/// the same root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Codebase {
    root: PathBuf,
    project_space: String,
    expression: Expression,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_provenance: Option<String>,
    status: TreeStatus,
}

impl Codebase {
    pub fn new(
        root: impl Into<PathBuf>,
        project_space: impl Into<String>,
        expression: Expression,
    ) -> Self {
        Self {
            root: root.into(),
            project_space: project_space.into(),
            expression,
            additional_provenance: None,
            status: TreeStatus::Modified,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_space(&self) -> &str {
        &self.project_space
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn additional_provenance(&self) -> Option<&str> {
        self.additional_provenance.as_deref()
    }

    pub fn status(&self) -> TreeStatus {
        self.status
    }

    /// True unless the producing step left its input untouched.
    pub fn needs_persist(&self) -> bool {
        self.status == TreeStatus::Modified
    }

    pub fn with_expression(&self, expression: Expression) -> Self {
        Self {
            expression,
            ..self.clone()
        }
    }

    pub fn with_project_space(&self, project_space: impl Into<String>) -> Self {
        Self {
            project_space: project_space.into(),
            ..self.clone()
        }
    }

    pub fn with_additional_provenance(&self, provenance: impl Into<String>) -> Self {
        Self {
            additional_provenance: Some(provenance.into()),
            ..self.clone()
        }
    }

    pub fn with_status(&self, status: TreeStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Content digest of the tree at `root`.
    pub fn digest(&self) -> Result<TreeDigest, CodebaseCreationError> {
        tree_digest(&self.root)
    }

    /// Whether both codebases hold the same files. Shared roots are equal
    /// without reading the trees.
    pub fn same_content(&self, other: &Codebase) -> Result<bool, CodebaseCreationError> {
        if self.root == other.root {
            return Ok(true);
        }
        Ok(self.digest()? == other.digest()?)
    }
}

//! Editors transform one codebase into another within a project space.

use crate::codebase::Codebase;
use crate::error::CodebaseCreationError;
use moe_kernel::Options;

/// A content transform, resolved by name from the project context.
///
/// Editors must not write into `input.root()`. The input is a cached
/// codebase that other expressions may share. Write the result to a new
/// tree, or hand back the input when nothing changes; the engine treats a
/// shared root as unmodified without reading the tree.
pub trait Editor: Send + Sync {
    fn name(&self) -> &str;

    fn edit(&self, input: &Codebase, options: &Options) -> Result<Codebase, CodebaseCreationError>;
}

/// Returns its input untouched.
#[derive(Debug, Clone)]
pub struct IdentityEditor {
    name: String,
}

impl IdentityEditor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Editor for IdentityEditor {
    fn name(&self) -> &str {
        &self.name
    }

    fn edit(&self, input: &Codebase, _options: &Options) -> Result<Codebase, CodebaseCreationError> {
        Ok(input.clone())
    }
}

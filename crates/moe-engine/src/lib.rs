//! # moe-engine
//!
//! Turns expressions into codebases.
//!
//! This crate provides:
//! - `Codebase` (a tree on disk plus its project space and expression) and
//!   a content digest for trees
//! - the `ProjectContext`, `Repository` and `Editor` traits the engine
//!   resolves identifiers through, with simple directory-backed impls
//! - translation paths and pipelines
//! - `ExpressionEngine`, which memoizes codebase creation per expression
//! - `ProjectConfig`, the TOML/JSON project file and its context builder
//!
//! VCS adapters, diffing and committing live elsewhere.
//!
//! ## Evaluation
//!
//! ```text
//! internal(revision=5)|scrub>public
//!     │ translate: prior is evaluated first (memoized)
//!     ├── edit "scrub"
//!     │     └── repository "internal" → check out
//!     └── pipeline internal>public → Modified | Unmodified
//! ```

pub mod codebase;
pub mod config;
pub mod context;
pub mod editor;
pub mod engine;
pub mod error;
pub mod repository;
pub mod translation;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use codebase::{Codebase, TreeStatus};
pub use config::{
    ConfigError, DEFAULT_PROJECT_SPACE, EditorConfig, EditorFactory, ProjectConfig, Registry,
    RepositoryConfig, RepositoryFactory, StepConfig, TranslatorConfig,
};
pub use context::{ProjectContext, StaticProjectContext};
pub use editor::{Editor, IdentityEditor};
pub use engine::{
    CodebaseProcessor, EditProcessor, ExpressionEngine, ProcessorTable, RepositoryProcessor,
    TranslateProcessor,
};
pub use error::CodebaseCreationError;
pub use repository::{DirectoryRepository, Repository};
pub use translation::{TranslationPath, TranslationPipeline, TranslationStep};
pub use tree::{TreeDigest, tree_digest};

//! Errors raised while turning an expression into a codebase.

use moe_kernel::Operator;

/// Why a codebase could not be created.
///
/// Resolution failures carry the identifier that was asked for and the
/// alternatives the project context does know about.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodebaseCreationError {
    #[error("no repository named {name:?}; known repositories: [{}]", .available.join(", "))]
    RepositoryNotFound { name: String, available: Vec<String> },

    #[error("no editor named {name:?}; known editors: [{}]", .available.join(", "))]
    EditorNotFound { name: String, available: Vec<String> },

    #[error(
        "could not find translator from project space {from:?} to {to:?}; \
         translators only available to [{}]",
        .destinations.join(", ")
    )]
    TranslatorNotFound {
        from: String,
        to: String,
        destinations: Vec<String>,
    },

    #[error("no codebase processor registered for {0} expressions")]
    NoProcessor(Operator),

    #[error("{operator} expression {expression} has no prior expression")]
    MissingPrior {
        operator: Operator,
        expression: String,
    },

    #[error("repository {repository:?} could not be checked out: {message}")]
    CheckOut { repository: String, message: String },

    #[error("editor {editor:?} failed: {message}")]
    Edit { editor: String, message: String },

    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },
}

impl CodebaseCreationError {
    pub fn io(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

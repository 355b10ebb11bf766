//! Codebase expressions.
//!
//! An expression describes how a codebase is derived: a reference to a
//! repository, followed by zero or more edits and translations. Expressions
//! are pure values. Every builder returns a new expression and leaves the
//! receiver untouched.
//!
//! The parser accepts chains of any length, so every walk over the `prior`
//! links (render, compare, hash, clone, drop) is a loop rather than a
//! recursion.
//!
//! ```text
//! internal(revision=42)|scrubber>public
//! └──── repository ───┘└─ edit ─┘└ translate ┘
//! ```

use crate::error::ExpressionError;
use crate::operation::{Operation, Operator};
use crate::parser;
use crate::term::{Options, Term};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Option key carrying the reference from-codebase of an inverse translation.
pub const REFERENCE_FROM_CODEBASE: &str = "referenceFromCodebase";

/// Option key carrying the reference to-codebase of an inverse translation.
pub const REFERENCE_TO_CODEBASE: &str = "referenceToCodebase";

/// Option key selecting a repository revision.
pub const REVISION_OPTION: &str = "revision";

/// A repository at a revision: the root of every expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryExpression {
    term: Term,
}

impl RepositoryExpression {
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.term.identifier
    }
}

/// An edit applied to a prior expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditExpression {
    prior: Box<Expression>,
    operation: Operation,
}

impl EditExpression {
    pub fn prior(&self) -> &Expression {
        &self.prior
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Name of the editor to apply.
    pub fn editor(&self) -> &str {
        &self.operation.term().identifier
    }
}

/// A translation of a prior expression into another project space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslateExpression {
    prior: Box<Expression>,
    operation: Operation,
}

impl TranslateExpression {
    pub fn prior(&self) -> &Expression {
        &self.prior
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Destination project space.
    pub fn to_project_space(&self) -> &str {
        &self.operation.term().identifier
    }
}

/// A codebase expression.
///
/// Serializes as its canonical string.
#[derive(Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Expression {
    Repository(RepositoryExpression),
    Edit(EditExpression),
    Translate(TranslateExpression),
}

impl Expression {
    /// Reference to the head of a repository.
    pub fn repository(name: impl Into<String>) -> Self {
        Self::repository_term(Term::new(name))
    }

    /// Reference to a repository with explicit options.
    pub fn repository_term(term: Term) -> Self {
        Self::Repository(RepositoryExpression { term })
    }

    /// Chain `operation` onto `prior`. The variant follows the operator.
    pub fn chain(prior: Expression, operation: Operation) -> Result<Self, ExpressionError> {
        match operation.operator() {
            Operator::Repository => Err(ExpressionError::NotChainable(Operator::Repository)),
            Operator::Translate if operation.term().identifier.is_empty() => {
                Err(ExpressionError::EmptyTranslateTarget)
            }
            Operator::Edit | Operator::Translate => Ok(Self::stack(prior, operation)),
        }
    }

    /// Wrap `prior` in an operation taken from an existing expression.
    fn stack(prior: Expression, operation: Operation) -> Self {
        let prior = Box::new(prior);
        match operation.operator() {
            Operator::Translate => Self::Translate(TranslateExpression { prior, operation }),
            Operator::Edit | Operator::Repository => Self::Edit(EditExpression { prior, operation }),
        }
    }

    fn rebuild<'a>(
        root: RepositoryExpression,
        operations: impl IntoIterator<Item = &'a Operation>,
    ) -> Self {
        operations
            .into_iter()
            .fold(Self::Repository(root), |prior, operation| {
                Self::stack(prior, operation.clone())
            })
    }

    /// Pin the root repository reference to `revision`.
    pub fn at_revision(&self, revision: impl Into<String>) -> Self {
        self.map_root(|term| term.with_option(REVISION_OPTION, revision))
    }

    /// Apply the editor `editor` to this expression.
    pub fn edit_with(&self, editor: impl Into<String>, options: Options) -> Self {
        Self::Edit(EditExpression {
            prior: Box::new(self.clone()),
            operation: Operation::edit(Term::with_options(editor, options)),
        })
    }

    /// Translate this expression into `project_space`.
    pub fn translate_to(
        &self,
        project_space: impl Into<String>,
        options: Options,
    ) -> Result<Self, ExpressionError> {
        let operation = Operation::new(
            Operator::Translate,
            Term::with_options(project_space, options),
        )?;
        Ok(Self::Translate(TranslateExpression {
            prior: Box::new(self.clone()),
            operation,
        }))
    }

    /// Returns a copy whose outermost term carries `key=value`.
    ///
    /// For a bare repository reference the outermost term is the root term.
    pub fn with_option(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            Self::Repository(repo) => Self::repository_term(repo.term.with_option(key, value)),
            Self::Edit(edit) => Self::Edit(EditExpression {
                prior: edit.prior.clone(),
                operation: edit.operation.with_option(key, value),
            }),
            Self::Translate(translate) => Self::Translate(TranslateExpression {
                prior: translate.prior.clone(),
                operation: translate.operation.with_option(key, value),
            }),
        }
    }

    /// Attach the reference from-codebase used by inverse translation when
    /// merging changes onto it.
    pub fn with_reference_from_codebase(&self, reference: &Expression) -> Self {
        self.with_option(REFERENCE_FROM_CODEBASE, reference.to_string())
    }

    /// Attach the reference to-codebase used by inverse translation to
    /// inspect changes such as renamings.
    pub fn with_reference_to_codebase(&self, reference: &Expression) -> Self {
        self.with_option(REFERENCE_TO_CODEBASE, reference.to_string())
    }

    /// The expression this one builds on, `None` for a repository reference.
    pub fn prior(&self) -> Option<&Expression> {
        match self {
            Self::Repository(_) => None,
            Self::Edit(edit) => Some(&edit.prior),
            Self::Translate(translate) => Some(&translate.prior),
        }
    }

    /// Operator of the outermost step.
    pub fn operator(&self) -> Operator {
        match self {
            Self::Repository(_) => Operator::Repository,
            Self::Edit(_) => Operator::Edit,
            Self::Translate(_) => Operator::Translate,
        }
    }

    /// Term of the outermost step.
    pub fn term(&self) -> &Term {
        match self {
            Self::Repository(repo) => &repo.term,
            Self::Edit(edit) => edit.operation.term(),
            Self::Translate(translate) => translate.operation.term(),
        }
    }

    /// The operation of the outermost step, `None` for a repository reference.
    pub fn operation(&self) -> Option<&Operation> {
        match self {
            Self::Repository(_) => None,
            Self::Edit(edit) => Some(&edit.operation),
            Self::Translate(translate) => Some(&translate.operation),
        }
    }

    /// The root repository reference.
    pub fn root(&self) -> &RepositoryExpression {
        let mut current = self;
        loop {
            match current {
                Self::Repository(repo) => return repo,
                Self::Edit(edit) => current = edit.prior.as_ref(),
                Self::Translate(translate) => current = translate.prior.as_ref(),
            }
        }
    }

    /// Operations on top of the root, innermost first.
    pub fn operations(&self) -> Vec<&Operation> {
        let mut operations: Vec<&Operation> =
            std::iter::successors(Some(self), |expr| expr.prior())
                .filter_map(Expression::operation)
                .collect();
        operations.reverse();
        operations
    }

    /// Number of chained operations on top of the root.
    pub fn depth(&self) -> usize {
        std::iter::successors(self.prior(), |expr| expr.prior()).count()
    }

    /// Canonical text form.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Parse the canonical text form.
    pub fn parse(input: &str) -> Result<Self, ExpressionError> {
        parser::parse(input)
    }

    fn map_root(&self, f: impl FnOnce(&Term) -> Term) -> Self {
        let root = RepositoryExpression {
            term: f(&self.root().term),
        };
        Self::rebuild(root, self.operations())
    }

    fn take_prior(&mut self) -> Option<Box<Expression>> {
        let prior = match self {
            Self::Repository(_) => return None,
            Self::Edit(edit) => &mut edit.prior,
            Self::Translate(translate) => &mut translate.prior,
        };
        Some(std::mem::replace(
            prior,
            Box::new(Self::repository_term(Term::new(""))),
        ))
    }
}

impl Clone for Expression {
    fn clone(&self) -> Self {
        Self::rebuild(self.root().clone(), self.operations())
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.root() == other.root() && self.operations() == other.operations()
    }
}

impl Hash for Expression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root().hash(state);
        self.operations().hash(state);
    }
}

impl Drop for Expression {
    fn drop(&mut self) {
        let mut next = self.take_prior();
        while let Some(mut prior) = next {
            next = prior.take_prior();
        }
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("root", self.root().term())
            .field("operations", &self.operations())
            .finish()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root().term)?;
        for operation in self.operations() {
            write!(f, "{operation}")?;
        }
        Ok(())
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

impl TryFrom<String> for Expression {
    type Error = ExpressionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parser::parse(&value)
    }
}

impl From<Expression> for String {
    fn from(value: Expression) -> Self {
        value.to_string()
    }
}

//! The expression engine.
//!
//! Evaluates an [`Expression`] against a [`ProjectContext`] into a
//! [`Codebase`]. Each operator is handled by a [`CodebaseProcessor`] found in
//! a [`ProcessorTable`]; processors evaluate prior expressions back through
//! the engine, so every sub-expression goes through the same cache.
//!
//! ## Memoization
//!
//! The engine keeps one slot per canonical expression string. A caller locks
//! the slot before evaluating, so concurrent requests for the same
//! expression wait for the first one and share its result: each distinct
//! expression is materialized at most once per engine. Failed evaluations
//! leave the slot empty and a later call retries.
//!
//! Slots of an expression and its priors are always locked outermost first,
//! and priors render strictly shorter than the expressions built on them,
//! so evaluation cannot deadlock.
//!
//! Create one engine per migration run and drop it afterwards.

use crate::codebase::{Codebase, TreeStatus};
use crate::context::ProjectContext;
use crate::error::CodebaseCreationError;
use crate::translation::TranslationPath;
use moe_kernel::{Expression, Operator};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, debug_span, info};

/// Creates the codebase for one kind of expression.
pub trait CodebaseProcessor: Send + Sync {
    fn create_codebase(
        &self,
        engine: &ExpressionEngine,
        expression: &Expression,
        context: &dyn ProjectContext,
    ) -> Result<Codebase, CodebaseCreationError>;
}

/// Processors keyed by operator.
#[derive(Clone)]
pub struct ProcessorTable {
    processors: BTreeMap<Operator, Arc<dyn CodebaseProcessor>>,
}

impl ProcessorTable {
    /// A table with no processors.
    pub fn empty() -> Self {
        Self {
            processors: BTreeMap::new(),
        }
    }

    /// Register (or replace) the processor for `operator`.
    pub fn register(mut self, operator: Operator, processor: Arc<dyn CodebaseProcessor>) -> Self {
        self.processors.insert(operator, processor);
        self
    }

    pub fn get(&self, operator: Operator) -> Option<&Arc<dyn CodebaseProcessor>> {
        self.processors.get(&operator)
    }

    pub fn operators(&self) -> impl Iterator<Item = Operator> + '_ {
        self.processors.keys().copied()
    }
}

impl Default for ProcessorTable {
    fn default() -> Self {
        Self::empty()
            .register(Operator::Repository, Arc::new(RepositoryProcessor))
            .register(Operator::Edit, Arc::new(EditProcessor))
            .register(Operator::Translate, Arc::new(TranslateProcessor))
    }
}

impl fmt::Debug for ProcessorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.processors.keys()).finish()
    }
}

type Slot = Arc<Mutex<Option<Codebase>>>;

pub struct ExpressionEngine {
    processors: ProcessorTable,
    cache: Mutex<HashMap<String, Slot>>,
}

impl ExpressionEngine {
    pub fn new() -> Self {
        Self::with_processors(ProcessorTable::default())
    }

    pub fn with_processors(processors: ProcessorTable) -> Self {
        Self {
            processors,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Evaluate `expression`, reusing any codebase already created for the
    /// same canonical expression by this engine.
    pub fn create_codebase(
        &self,
        expression: &Expression,
        context: &dyn ProjectContext,
    ) -> Result<Codebase, CodebaseCreationError> {
        let key = expression.to_string();
        let slot = Arc::clone(self.cache.lock().entry(key.clone()).or_default());

        let mut guard = slot.lock();
        if let Some(codebase) = guard.as_ref() {
            debug!(expression = %key, "codebase cache hit");
            return Ok(codebase.clone());
        }

        let span = debug_span!("create_codebase", expression = %key);
        let _entered = span.enter();
        let operator = expression.operator();
        let processor = self
            .processors
            .get(operator)
            .ok_or(CodebaseCreationError::NoProcessor(operator))?;
        let codebase = processor.create_codebase(self, expression, context)?;
        *guard = Some(codebase.clone());
        Ok(codebase)
    }

    /// The cached codebase for `expression`, without evaluating anything.
    pub fn cached(&self, expression: &Expression) -> Option<Codebase> {
        let slot = self.cache.lock().get(&expression.to_string()).cloned()?;
        let guard = slot.lock();
        guard.clone()
    }

    /// Number of expressions with a cached codebase.
    pub fn cache_len(&self) -> usize {
        let slots: Vec<Slot> = self.cache.lock().values().cloned().collect();
        slots.iter().filter(|slot| slot.lock().is_some()).count()
    }
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExpressionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionEngine")
            .field("processors", &self.processors)
            .field("cached", &self.cache_len())
            .finish()
    }
}

fn prior_of(expression: &Expression) -> Result<&Expression, CodebaseCreationError> {
    expression
        .prior()
        .ok_or_else(|| CodebaseCreationError::MissingPrior {
            operator: expression.operator(),
            expression: expression.to_string(),
        })
}

/// Checks out the referenced repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryProcessor;

impl CodebaseProcessor for RepositoryProcessor {
    fn create_codebase(
        &self,
        _engine: &ExpressionEngine,
        expression: &Expression,
        context: &dyn ProjectContext,
    ) -> Result<Codebase, CodebaseCreationError> {
        let term = expression.term();
        let repository = context.repository(&term.identifier).ok_or_else(|| {
            CodebaseCreationError::RepositoryNotFound {
                name: term.identifier.clone(),
                available: context.repository_names(),
            }
        })?;

        let root = repository.check_out(&term.options)?;
        info!(
            repository = %term.identifier,
            root = %root.display(),
            "checked out codebase"
        );
        Ok(Codebase::new(
            root,
            repository.project_space(),
            expression.clone(),
        ))
    }
}

/// Applies a named editor to the prior codebase.
///
/// The result is unmodified when it holds the same files as the input,
/// whether the editor handed back the input tree or wrote a copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditProcessor;

impl CodebaseProcessor for EditProcessor {
    fn create_codebase(
        &self,
        engine: &ExpressionEngine,
        expression: &Expression,
        context: &dyn ProjectContext,
    ) -> Result<Codebase, CodebaseCreationError> {
        let input = engine.create_codebase(prior_of(expression)?, context)?;
        let term = expression.term();
        let editor = context.editor(&term.identifier).ok_or_else(|| {
            CodebaseCreationError::EditorNotFound {
                name: term.identifier.clone(),
                available: context.editor_names(),
            }
        })?;

        info!(
            editor = %term.identifier,
            input = %input.root().display(),
            "editing codebase"
        );
        let edited = editor.edit(&input, &term.options)?;
        let status = if edited.same_content(&input)? {
            TreeStatus::Unmodified
        } else {
            TreeStatus::Modified
        };
        Ok(edited
            .with_expression(expression.clone())
            .with_project_space(input.project_space())
            .with_status(status))
    }
}

/// Runs the registered pipeline from the prior codebase's project space to
/// the term's destination space.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslateProcessor;

impl CodebaseProcessor for TranslateProcessor {
    fn create_codebase(
        &self,
        engine: &ExpressionEngine,
        expression: &Expression,
        context: &dyn ProjectContext,
    ) -> Result<Codebase, CodebaseCreationError> {
        let input = engine.create_codebase(prior_of(expression)?, context)?;
        let term = expression.term();
        let to_project_space = term.identifier.as_str();
        let path = TranslationPath::new(input.project_space(), to_project_space);

        let pipeline = context.translators().get(&path).ok_or_else(|| {
            CodebaseCreationError::TranslatorNotFound {
                from: path.from_project_space.clone(),
                to: path.to_project_space.clone(),
                destinations: context.translation_destinations(),
            }
        })?;

        info!(
            "Translating {} from project space \"{}\" to \"{}\"",
            input.root().display(),
            input.project_space(),
            to_project_space
        );
        let translated = pipeline.translate(&input, &term.options)?;

        let status = if translated.same_content(&input)? {
            info!(root = %translated.root().display(), "translation finished (unmodified)");
            TreeStatus::Unmodified
        } else {
            info!(root = %translated.root().display(), "translation finished");
            TreeStatus::Modified
        };

        Ok(translated
            .with_expression(expression.clone())
            .with_project_space(to_project_space)
            .with_status(status))
    }
}

//! Translation between project spaces.
//!
//! A pipeline is registered per `(from, to)` project-space pair. Applying it
//! folds the input codebase through each step in registration order; every
//! step sees the previous step's output and the translate term's options.

use crate::codebase::Codebase;
use crate::editor::Editor;
use crate::error::CodebaseCreationError;
use moe_kernel::Options;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Lookup key for a translation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationPath {
    pub from_project_space: String,
    pub to_project_space: String,
}

impl TranslationPath {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from_project_space: from.into(),
            to_project_space: to.into(),
        }
    }
}

impl fmt::Display for TranslationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>{}", self.from_project_space, self.to_project_space)
    }
}

/// One named step of a pipeline.
#[derive(Clone)]
pub struct TranslationStep {
    name: String,
    editor: Arc<dyn Editor>,
}

impl TranslationStep {
    pub fn new(name: impl Into<String>, editor: Arc<dyn Editor>) -> Self {
        Self {
            name: name.into(),
            editor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn editor(&self) -> &dyn Editor {
        self.editor.as_ref()
    }
}

impl fmt::Debug for TranslationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationStep")
            .field("name", &self.name)
            .field("editor", &self.editor.name())
            .finish()
    }
}

/// Ordered editor chain. An empty pipeline is the identity translation.
#[derive(Debug, Clone, Default)]
pub struct TranslationPipeline {
    steps: Vec<TranslationStep>,
}

impl TranslationPipeline {
    pub fn new(steps: Vec<TranslationStep>) -> Self {
        Self { steps }
    }

    pub fn with_step(mut self, name: impl Into<String>, editor: Arc<dyn Editor>) -> Self {
        self.steps.push(TranslationStep::new(name, editor));
        self
    }

    pub fn steps(&self) -> &[TranslationStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step in order.
    pub fn translate(
        &self,
        input: &Codebase,
        options: &Options,
    ) -> Result<Codebase, CodebaseCreationError> {
        let mut current = input.clone();
        for step in &self.steps {
            debug!(
                step = %step.name,
                editor = step.editor.name(),
                root = %current.root().display(),
                "applying translation step"
            );
            current = step.editor.edit(&current, options)?;
        }
        Ok(current)
    }
}

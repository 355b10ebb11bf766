//! The project context an expression is evaluated against.
//!
//! A project context names the repositories, editors, and translation
//! pipelines of one MOE project. The engine only reads it.

use crate::editor::Editor;
use crate::repository::Repository;
use crate::translation::{TranslationPath, TranslationPipeline};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

pub trait ProjectContext: Send + Sync {
    fn repository(&self, name: &str) -> Option<Arc<dyn Repository>>;

    /// Known repository names, sorted.
    fn repository_names(&self) -> Vec<String>;

    fn editor(&self, name: &str) -> Option<Arc<dyn Editor>>;

    /// Known editor names, sorted.
    fn editor_names(&self) -> Vec<String>;

    fn translators(&self) -> &BTreeMap<TranslationPath, TranslationPipeline>;

    /// Every project space some pipeline translates into, sorted and unique.
    fn translation_destinations(&self) -> Vec<String> {
        self.translators()
            .keys()
            .map(|path| path.to_project_space.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// A fixed, in-memory project context.
#[derive(Clone, Default)]
pub struct StaticProjectContext {
    name: String,
    repositories: BTreeMap<String, Arc<dyn Repository>>,
    editors: BTreeMap<String, Arc<dyn Editor>>,
    translators: BTreeMap<TranslationPath, TranslationPipeline>,
}

impl StaticProjectContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a repository under its own name.
    pub fn with_repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repositories
            .insert(repository.name().to_string(), repository);
        self
    }

    /// Register an editor under its own name.
    pub fn with_editor(mut self, editor: Arc<dyn Editor>) -> Self {
        self.editors.insert(editor.name().to_string(), editor);
        self
    }

    pub fn with_translator(mut self, path: TranslationPath, pipeline: TranslationPipeline) -> Self {
        self.translators.insert(path, pipeline);
        self
    }
}

impl ProjectContext for StaticProjectContext {
    fn repository(&self, name: &str) -> Option<Arc<dyn Repository>> {
        self.repositories.get(name).cloned()
    }

    fn repository_names(&self) -> Vec<String> {
        self.repositories.keys().cloned().collect()
    }

    fn editor(&self, name: &str) -> Option<Arc<dyn Editor>> {
        self.editors.get(name).cloned()
    }

    fn editor_names(&self) -> Vec<String> {
        self.editors.keys().cloned().collect()
    }

    fn translators(&self) -> &BTreeMap<TranslationPath, TranslationPipeline> {
        &self.translators
    }
}

impl fmt::Debug for StaticProjectContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticProjectContext")
            .field("name", &self.name)
            .field("repositories", &self.repository_names())
            .field("editors", &self.editor_names())
            .field("translators", &self.translators.keys().collect::<Vec<_>>())
            .finish()
    }
}

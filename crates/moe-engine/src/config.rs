//! Project configuration.
//!
//! A project file names the repositories, editors and translators of one
//! MOE project. It can be written in TOML or JSON; [`ProjectConfig::load`]
//! picks the format from the file extension. Config values are immutable;
//! `with_*` methods return modified copies.
//!
//! ```toml
//! name = "demo"
//!
//! [repositories.internal]
//! type = "directory"
//! url = "/srv/internal"
//! project_space = "internal"
//!
//! [[translators]]
//! from_project_space = "internal"
//! to_project_space = "public"
//! steps = [{ name = "noop", editor = { type = "identity" } }]
//! ```

use crate::context::StaticProjectContext;
use crate::editor::{Editor, IdentityEditor};
use crate::repository::{DirectoryRepository, Repository};
use crate::translation::{TranslationPath, TranslationPipeline};
use moe_kernel::Options;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_PROJECT_SPACE: &str = "public";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid json at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported config format for {path} (expected .toml or .json)")]
    UnsupportedFormat { path: String },

    #[error("invalid project config: {0}")]
    InvalidProject(String),

    #[error("{what} {name:?} has unknown type {kind:?}; known types: [{}]", .available.join(", "))]
    UnknownType {
        what: &'static str,
        name: String,
        kind: String,
        available: Vec<String>,
    },
}

fn default_project_space() -> String {
    DEFAULT_PROJECT_SPACE.to_string()
}

/// One repository of the project.
///
/// `paths`, `ignore_file_res`, `executable_file_res`,
/// `ignore_incoming_changes_res` and `preserve_authors` are carried for VCS
/// adapters registered from outside this crate. The built-in `directory`
/// type cannot narrow a checkout, so it rejects `paths` and
/// `ignore_file_res` rather than silently check out more than asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_project_space")]
    pub project_space: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_file_res: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub executable_file_res: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_incoming_changes_res: Vec<String>,
    #[serde(default)]
    pub preserve_authors: bool,
}

impl RepositoryConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            url: None,
            project_space: default_project_space(),
            branch: None,
            paths: Vec::new(),
            ignore_file_res: Vec::new(),
            executable_file_res: Vec::new(),
            ignore_incoming_changes_res: Vec::new(),
            preserve_authors: false,
        }
    }

    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..self.clone()
        }
    }

    pub fn with_branch(&self, branch: impl Into<String>) -> Self {
        Self {
            branch: Some(branch.into()),
            ..self.clone()
        }
    }

    pub fn with_project_space(&self, project_space: impl Into<String>) -> Self {
        Self {
            project_space: project_space.into(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: Options,
}

impl EditorConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: Options::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    pub name: String,
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub from_project_space: String,
    pub to_project_space: String,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

impl TranslatorConfig {
    pub fn path(&self) -> TranslationPath {
        TranslationPath::new(&self.from_project_space, &self.to_project_space)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub repositories: BTreeMap<String, RepositoryConfig>,
    #[serde(default)]
    pub editors: BTreeMap<String, EditorConfig>,
    #[serde(default)]
    pub translators: Vec<TranslatorConfig>,
}

impl ProjectConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        parse_toml(text, "<input>")
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        parse_json(text, "<input>")
    }

    /// Read and validate a project file. `.toml` and `.json` are accepted.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let parse = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => parse_toml,
            Some("json") => parse_json,
            _ => return Err(ConfigError::UnsupportedFormat { path: label }),
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: label.clone(),
            source,
        })?;
        let config = parse(&text, &label)?;
        config.validate()?;
        debug!(
            project = %config.name,
            path = %label,
            repositories = config.repositories.len(),
            translators = config.translators.len(),
            "loaded project config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(invalid("project name must not be empty"));
        }
        if let Some(name) = self
            .repositories
            .keys()
            .chain(self.editors.keys())
            .find(|name| name.trim().is_empty())
        {
            return Err(invalid(format!("empty repository or editor name {name:?}")));
        }
        if let Some((name, _)) = self
            .repositories
            .iter()
            .find(|(_, repo)| repo.project_space.trim().is_empty())
        {
            return Err(invalid(format!(
                "repository {name:?} has an empty project space"
            )));
        }

        let mut seen = BTreeSet::new();
        for translator in &self.translators {
            let path = translator.path();
            if path.from_project_space.is_empty() || path.to_project_space.is_empty() {
                return Err(invalid(format!("translator {path} has an empty endpoint")));
            }
            if path.from_project_space == path.to_project_space {
                return Err(invalid(format!(
                    "translator {path} translates a project space into itself"
                )));
            }
            if !seen.insert(path.clone()) {
                return Err(invalid(format!("duplicate translator {path}")));
            }
        }
        Ok(())
    }

    pub fn with_repository(&self, name: impl Into<String>, repository: RepositoryConfig) -> Self {
        let mut next = self.clone();
        next.repositories.insert(name.into(), repository);
        next
    }

    /// Instantiate every repository, editor and translator through `registry`.
    pub fn build_context(&self, registry: &Registry) -> Result<StaticProjectContext, ConfigError> {
        self.validate()?;
        let mut context = StaticProjectContext::new(&self.name);

        for (name, config) in &self.repositories {
            context = context.with_repository(registry.repository(name, config)?);
        }
        for (name, config) in &self.editors {
            context = context.with_editor(registry.editor(name, config)?);
        }
        for translator in &self.translators {
            let mut pipeline = TranslationPipeline::default();
            for step in &translator.steps {
                pipeline = pipeline.with_step(&step.name, registry.editor(&step.name, &step.editor)?);
            }
            context = context.with_translator(translator.path(), pipeline);
        }
        Ok(context)
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidProject(message.into())
}

fn parse_toml(text: &str, path: &str) -> Result<ProjectConfig, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Toml {
        path: path.to_string(),
        source,
    })
}

fn parse_json(text: &str, path: &str) -> Result<ProjectConfig, ConfigError> {
    serde_json::from_str(text).map_err(|source| ConfigError::Json {
        path: path.to_string(),
        source,
    })
}

pub type RepositoryFactory = fn(&str, &RepositoryConfig) -> Result<Arc<dyn Repository>, ConfigError>;

pub type EditorFactory = fn(&str, &EditorConfig) -> Result<Arc<dyn Editor>, ConfigError>;

/// Factories for repository and editor types, keyed by the config `type`.
#[derive(Debug, Clone)]
pub struct Registry {
    repositories: BTreeMap<String, RepositoryFactory>,
    editors: BTreeMap<String, EditorFactory>,
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            repositories: BTreeMap::new(),
            editors: BTreeMap::new(),
        }
    }

    pub fn with_repository_type(mut self, kind: impl Into<String>, factory: RepositoryFactory) -> Self {
        self.repositories.insert(kind.into(), factory);
        self
    }

    pub fn with_editor_type(mut self, kind: impl Into<String>, factory: EditorFactory) -> Self {
        self.editors.insert(kind.into(), factory);
        self
    }

    pub fn repository(
        &self,
        name: &str,
        config: &RepositoryConfig,
    ) -> Result<Arc<dyn Repository>, ConfigError> {
        let factory = self
            .repositories
            .get(&config.kind)
            .ok_or_else(|| ConfigError::UnknownType {
                what: "repository",
                name: name.to_string(),
                kind: config.kind.clone(),
                available: self.repositories.keys().cloned().collect(),
            })?;
        factory(name, config)
    }

    pub fn editor(&self, name: &str, config: &EditorConfig) -> Result<Arc<dyn Editor>, ConfigError> {
        let factory = self
            .editors
            .get(&config.kind)
            .ok_or_else(|| ConfigError::UnknownType {
                what: "editor",
                name: name.to_string(),
                kind: config.kind.clone(),
                available: self.editors.keys().cloned().collect(),
            })?;
        factory(name, config)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::empty()
            .with_repository_type("directory", directory_repository)
            .with_editor_type("identity", identity_editor)
    }
}

fn directory_repository(
    name: &str,
    config: &RepositoryConfig,
) -> Result<Arc<dyn Repository>, ConfigError> {
    let Some(url) = config.url.as_deref() else {
        return Err(invalid(format!(
            "directory repository {name:?} needs a url"
        )));
    };
    let unsupported = [
        ("paths", config.paths.is_empty()),
        ("ignore_file_res", config.ignore_file_res.is_empty()),
    ];
    if let Some((field, _)) = unsupported.iter().find(|(_, empty)| !empty) {
        return Err(invalid(format!(
            "directory repository {name:?} does not support {field}"
        )));
    }
    Ok(Arc::new(DirectoryRepository::new(
        name,
        &config.project_space,
        url,
    )))
}

fn identity_editor(name: &str, _config: &EditorConfig) -> Result<Arc<dyn Editor>, ConfigError> {
    Ok(Arc::new(IdentityEditor::new(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ProjectContext;
    use crate::test_support::TempDirGuard;

    const DEMO_TOML: &str = r#"
name = "demo"

[repositories.internal]
type = "directory"
url = "/srv/internal"
project_space = "internal"
ignore_incoming_changes_res = ["^docs/"]
preserve_authors = true

[repositories.public]
type = "directory"
url = "/srv/public"

[editors.scrub]
type = "identity"
options = { level = "strict" }

[[translators]]
from_project_space = "internal"
to_project_space = "public"
steps = [{ name = "noop", editor = { type = "identity" } }]
"#;

    #[test]
    fn parses_toml_with_defaults() {
        let config = ProjectConfig::from_toml_str(DEMO_TOML).expect("demo config");
        assert_eq!(config.name, "demo");
        assert_eq!(config.repositories["internal"].project_space, "internal");
        assert_eq!(config.repositories["public"].project_space, "public");
        assert_eq!(
            config.repositories["internal"].ignore_incoming_changes_res,
            vec!["^docs/".to_string()]
        );
        assert!(config.repositories["internal"].preserve_authors);
        assert!(!config.repositories["public"].preserve_authors);
        assert_eq!(config.editors["scrub"].options["level"], "strict");
        assert_eq!(
            config.translators[0].path(),
            TranslationPath::new("internal", "public")
        );
        config.validate().expect("demo config is valid");
    }

    #[test]
    fn json_and_toml_describe_the_same_project() {
        let from_toml = ProjectConfig::from_toml_str(DEMO_TOML).expect("toml");
        let json = serde_json::to_string(&from_toml).expect("serialize");
        let from_json = ProjectConfig::from_json_str(&json).expect("json");
        assert_eq!(from_toml, from_json);
    }

    #[test]
    fn with_constructors_return_new_values() {
        let base = RepositoryConfig::new("directory");
        let branched = base.with_branch("main").with_url("/srv/repo");
        assert_eq!(base.branch, None);
        assert_eq!(base.url, None);
        assert_eq!(branched.branch.as_deref(), Some("main"));
        assert_eq!(branched.url.as_deref(), Some("/srv/repo"));
        assert_eq!(branched.project_space, DEFAULT_PROJECT_SPACE);
    }

    #[test]
    fn validate_rejects_bad_translators() {
        let config = ProjectConfig::from_toml_str(DEMO_TOML).expect("demo config");

        let mut duplicate = config.clone();
        duplicate.translators.push(duplicate.translators[0].clone());
        let err = duplicate.validate().expect_err("duplicate path");
        assert_eq!(
            err.to_string(),
            "invalid project config: duplicate translator internal>public"
        );

        let mut reflexive = config.clone();
        reflexive.translators[0].to_project_space = "internal".to_string();
        assert!(matches!(
            reflexive.validate(),
            Err(ConfigError::InvalidProject(message)) if message.contains("into itself")
        ));

        let mut unnamed = config;
        unnamed.name = " ".to_string();
        assert!(matches!(unnamed.validate(), Err(ConfigError::InvalidProject(_))));
    }

    #[test]
    fn build_context_instantiates_registered_types() {
        let context = ProjectConfig::from_toml_str(DEMO_TOML)
            .expect("demo config")
            .build_context(&Registry::default())
            .expect("context");

        assert_eq!(context.name(), "demo");
        assert_eq!(
            context.repository_names(),
            vec!["internal".to_string(), "public".to_string()]
        );
        assert_eq!(context.editor_names(), vec!["scrub".to_string()]);
        let internal = context.repository("internal").expect("internal repo");
        assert_eq!(internal.project_space(), "internal");
        let pipeline = &context.translators()[&TranslationPath::new("internal", "public")];
        assert_eq!(pipeline.steps().len(), 1);
        assert_eq!(pipeline.steps()[0].name(), "noop");
    }

    #[test]
    fn unknown_types_fail_with_known_alternatives() {
        let config = ProjectConfig::from_toml_str(DEMO_TOML)
            .expect("demo config")
            .with_repository("git", RepositoryConfig::new("git").with_url("https://example.com"));
        let err = config
            .build_context(&Registry::default())
            .expect_err("git repositories are not built in");
        assert_eq!(
            err.to_string(),
            "repository \"git\" has unknown type \"git\"; known types: [directory]"
        );
    }

    #[test]
    fn directory_repository_needs_url() {
        let config = ProjectConfig::from_toml_str("name = \"demo\"\n")
            .expect("minimal config")
            .with_repository("bare", RepositoryConfig::new("directory"));
        assert!(matches!(
            config.build_context(&Registry::default()),
            Err(ConfigError::InvalidProject(message)) if message.contains("needs a url")
        ));
    }

    #[test]
    fn directory_repository_rejects_checkout_filters() {
        let base = RepositoryConfig::new("directory").with_url("/srv/internal");
        let narrowed = RepositoryConfig {
            paths: vec!["src".to_string()],
            ..base.clone()
        };
        let filtered = RepositoryConfig {
            ignore_file_res: vec![r"\.orig$".to_string()],
            ..base
        };
        for (field, repository) in [("paths", narrowed), ("ignore_file_res", filtered)] {
            let config = ProjectConfig::from_toml_str("name = \"demo\"\n")
                .expect("minimal config")
                .with_repository("internal", repository);
            match config.build_context(&Registry::default()) {
                Err(ConfigError::InvalidProject(message)) => {
                    assert!(message.contains(&format!("does not support {field}")), "{message}");
                }
                other => panic!("expected {field} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn load_picks_format_from_extension() {
        let dir = TempDirGuard::new("config-load");
        dir.write("moe.toml", DEMO_TOML);
        dir.write("moe.yaml", "name: demo\n");
        dir.write("broken.json", "{\"name\":");

        let loaded = ProjectConfig::load(dir.path().join("moe.toml")).expect("toml load");
        assert_eq!(loaded.name, "demo");
        assert!(matches!(
            ProjectConfig::load(dir.path().join("moe.yaml")),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            ProjectConfig::load(dir.path().join("broken.json")),
            Err(ConfigError::Json { .. })
        ));
        assert!(matches!(
            ProjectConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}

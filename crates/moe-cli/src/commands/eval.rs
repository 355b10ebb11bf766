use crate::support::{fail, parse_expression_or_exit, print_json};
use moe_engine::{ExpressionEngine, ProjectConfig, Registry};
use serde_json::json;
use tracing::{debug, info};

pub fn run(expression: String, config: String, json_output: bool) {
    let parsed = parse_expression_or_exit(&expression);
    let project = ProjectConfig::load(&config).unwrap_or_else(|e| fail(e));
    let context = project
        .build_context(&Registry::default())
        .unwrap_or_else(|e| fail(e));

    debug!(
        config = %config,
        repositories = project.repositories.len(),
        translators = project.translators.len(),
        "built project context"
    );

    info!(project = %project.name, expression = %parsed, "evaluating expression");
    let engine = ExpressionEngine::new();
    let codebase = engine
        .create_codebase(&parsed, &context)
        .unwrap_or_else(|e| fail(format!("could not create codebase for {parsed}: {e}")));

    if json_output {
        print_json(&json!({
            "action": "eval",
            "project": project.name,
            "codebase": codebase,
        }));
    } else {
        println!(
            "moe eval\n  Expression: {}\n  Project space: {}\n  Root: {}\n  Needs persist: {}",
            codebase.expression(),
            codebase.project_space(),
            codebase.root().display(),
            codebase.needs_persist()
        );
    }
}

use crate::support::{parse_expression_or_exit, print_json};
use serde_json::json;

pub fn run(expression: String, json_output: bool) {
    let parsed = parse_expression_or_exit(&expression);
    let canonical = parsed.render();

    if json_output {
        let term = parsed.term();
        print_json(&json!({
            "action": "render",
            "expression": canonical,
            "operator": parsed.operator().as_str(),
            "identifier": term.identifier,
            "options": term.options,
            "repository": parsed.root().name(),
            "depth": parsed.depth(),
        }));
    } else {
        println!("{canonical}");
    }
}

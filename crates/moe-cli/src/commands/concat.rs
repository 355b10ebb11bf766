use crate::support::{fail, parse_revision_or_exit, print_json};
use moe_db::{RevisionMetadata, concatenate};
use serde_json::json;
use std::fs;

pub fn run(input: String, migrated_from: Option<String>, json_output: bool) {
    let text = fs::read_to_string(&input)
        .unwrap_or_else(|e| fail(format!("failed to read {input}: {e}")));
    let records: Vec<RevisionMetadata> = serde_json::from_str(&text)
        .unwrap_or_else(|e| fail(format!("invalid revision metadata in {input}: {e}")));
    let migrated_from = migrated_from.as_deref().map(parse_revision_or_exit);

    let merged = concatenate(&records, migrated_from.as_ref()).unwrap_or_else(|e| fail(e));

    if json_output {
        print_json(&json!({
            "action": "concat",
            "inputCount": records.len(),
            "metadata": merged,
        }));
    } else {
        println!(
            "id: {}\nauthor: {}\ndate: {}\n\n{}",
            merged.id,
            merged.author,
            merged.date.to_rfc3339(),
            merged.description
        );
    }
}

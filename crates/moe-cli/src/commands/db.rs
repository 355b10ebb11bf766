use crate::cli::DbCommands;
use crate::support::{fail, parse_revision_or_exit, print_json};
use moe_db::{EquivalenceStore, RepositoryEquivalence, mutate_db_file};
use serde_json::json;
use std::path::PathBuf;
use tracing::debug;

pub fn run(command: DbCommands) {
    match command {
        DbCommands::Record {
            first,
            second,
            db,
            json,
        } => run_record(first, second, db, json),
        DbCommands::Find {
            revision,
            other_repository,
            db,
            json,
        } => run_find(revision, other_repository, db, json),
    }
}

fn run_record(first: String, second: String, db: String, json_output: bool) {
    let equivalence = RepositoryEquivalence::new(
        parse_revision_or_exit(&first),
        parse_revision_or_exit(&second),
    );
    let (rev1, rev2) = equivalence.revisions();
    if rev1.repository_name == rev2.repository_name {
        fail(format!(
            "cannot record an equivalence within one repository: {equivalence}"
        ));
    }

    let path = PathBuf::from(db);
    let (recorded, db) = mutate_db_file(&path, |state| state.record_equivalence(equivalence.clone()))
        .unwrap_or_else(|e| fail(format!("failed to update {}: {e}", path.display())));
    debug!(
        path = %path.display(),
        %equivalence,
        recorded,
        equivalences = db.equivalences().count(),
        "db record finished"
    );

    if json_output {
        print_json(&json!({
            "action": "db.record",
            "dbPath": path.display().to_string(),
            "equivalence": equivalence,
            "recorded": recorded,
        }));
    } else {
        println!(
            "moe db record\n  {}: {}\n  Path: {}",
            if recorded { "Recorded" } else { "Already known" },
            equivalence,
            path.display()
        );
    }
}

fn run_find(revision: String, other_repository: String, db: String, json_output: bool) {
    let revision = parse_revision_or_exit(&revision);
    let path = PathBuf::from(db);
    let store = EquivalenceStore::open(&path)
        .unwrap_or_else(|e| fail(format!("failed to load {}: {e}", path.display())));
    let found = store.find(&revision, &other_repository);

    if json_output {
        print_json(&json!({
            "action": "db.find",
            "dbPath": path.display().to_string(),
            "revision": revision,
            "otherRepository": other_repository,
            "equivalents": found,
        }));
    } else if found.is_empty() {
        println!("moe db find\n  No equivalents of {revision} in {other_repository}");
    } else {
        println!("moe db find\n  Equivalents of {revision} in {other_repository}:");
        for equivalent in &found {
            println!("  - {equivalent}");
        }
    }
}

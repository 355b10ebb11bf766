use moe_db::Revision;
use moe_kernel::Expression;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "moe=info";

/// Log to stderr, filtered by `RUST_LOG` (default `moe=info`).
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

pub fn parse_expression_or_exit(text: &str) -> Expression {
    Expression::parse(text).unwrap_or_else(|e| fail(format!("invalid expression {text:?}: {e}")))
}

pub fn parse_revision_or_exit(text: &str) -> Revision {
    Revision::parse_qualified(text)
        .unwrap_or_else(|| fail(format!("invalid revision {text:?} (expected repository:revId)")))
}

pub fn print_json(payload: &impl Serialize) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{text}"),
        Err(e) => fail(format!("json serialization failed: {e}")),
    }
}

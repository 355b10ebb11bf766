use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "moe",
    about = "MOE: inspect codebase expressions, project configs and equivalence dbs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse an expression and print its canonical form
    Render {
        /// Expression text, e.g. `internal(revision=5)|scrub>public`
        expression: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate an expression against a project config
    Eval {
        /// Expression text
        expression: String,

        /// Project config (.toml or .json)
        #[arg(long)]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read or update an equivalence db
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },

    /// Merge revision metadata into one migration commit description
    Concat {
        /// JSON file holding an array of revision metadata records
        #[arg(long)]
        input: String,

        /// Source revision (`repository:revId`) to stamp as provenance
        #[arg(long)]
        migrated_from: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Record that two revisions hold the same content
    Record {
        /// First revision (`repository:revId`)
        first: String,

        /// Second revision (`repository:revId`)
        second: String,

        /// Path to the equivalence db
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List revisions in another repository equivalent to a revision
    Find {
        /// Revision to look up (`repository:revId`)
        revision: String,

        /// Repository to find equivalents in
        #[arg(long)]
        other_repository: String,

        /// Path to the equivalence db
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub const DEFAULT_DB_PATH: &str = ".moe/db.json";

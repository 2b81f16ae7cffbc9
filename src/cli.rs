use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tapp_import_common::EntityKind;

#[derive(Parser)]
#[command(name = "tapp-import")]
#[command(
    about = "Preview bulk imports of applicants, positions, assignments and more",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the importable entity kinds and their fields
    Schemas {
        /// Print the schemas as JSON
        #[arg(long)]
        json: bool,
    },

    /// Normalize an import file and print the canonical records
    Normalize {
        /// Entity kind (instructors, applicants, positions, assignments, postings,
        /// applicant_matching, ddahs)
        #[arg(required = true)]
        kind: EntityKind,

        /// Import file (.json, .xlsx, .xls, .ods)
        #[arg(required = true)]
        input: PathBuf,

        /// Extra header synonyms (JSON object: header → field)
        #[arg(long)]
        aliases: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Diff an import file against the current records
    Preview {
        /// Entity kind
        #[arg(required = true)]
        kind: EntityKind,

        /// Import file (.json, .xlsx, .xls, .ods)
        #[arg(required = true)]
        input: PathBuf,

        /// Snapshot of the existing records (default: the configured snapshot)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Extra header synonyms (JSON object: header → field)
        #[arg(long)]
        aliases: Option<PathBuf>,

        /// Print only the new and modified entities
        #[arg(long)]
        changed_only: bool,

        /// Print JSON instead of a review summary
        #[arg(long)]
        json: bool,
    },

    /// Show or edit the configuration
    Config {
        /// Show the configuration
        #[arg(long)]
        show: bool,

        /// Default snapshot file for `preview`
        #[arg(long)]
        set_snapshot: Option<PathBuf>,

        /// Warn about unrecognized spreadsheet columns
        #[arg(long)]
        log_unrecognized: Option<bool>,

        /// Report every missing required field
        #[arg(long)]
        collect_all_missing: Option<bool>,
    },
}

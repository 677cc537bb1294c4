use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ragmill",
    version,
    about = "Turn a folder of markdown into a queryable vector index"
)]
pub struct Args {
    /// Config file (defaults to ./ragmill.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rebuild the index from the full knowledge directory
    Rebuild,

    /// Apply only the changes since the last run
    Update,

    /// Add a single knowledge file to the index
    Add {
        /// File to ingest
        file: PathBuf,
    },

    /// Stop tracking a knowledge file (vectors remain until a rebuild)
    Remove {
        /// File to remove
        file: PathBuf,
    },

    /// Show index state and counts
    Status {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Retrieve the top-k passages for a question
    Query {
        /// The question to embed and search with
        text: String,

        /// How many passages to return
        #[arg(short)]
        k: Option<usize>,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

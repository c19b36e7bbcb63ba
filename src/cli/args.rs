//! CLI argument definitions using clap
//!
//! Commands:
//! - docrepo page --config <path>
//! - docrepo cursor --config <path> --entity <name>
//! - docrepo collection <TypeName>
//! - docrepo run --config <path> --entity <name> --data <fixture> (--page | --cursor)

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// docrepo - compile and run paged queries against a document search backend
#[derive(Parser, Debug)]
#[command(name = "docrepo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a page query read from stdin into the search DSL
    Page {
        /// Path to configuration file
        #[arg(long, default_value = "./docrepo.json")]
        config: PathBuf,
    },

    /// Compile a cursor query read from stdin into the search DSL
    Cursor {
        /// Path to configuration file
        #[arg(long, default_value = "./docrepo.json")]
        config: PathBuf,

        /// Entity whose schema validates the cursor property
        #[arg(long)]
        entity: String,
    },

    /// Print the collection name derived from a type name
    Collection {
        /// Type name, e.g. UserProfile
        type_name: String,
    },

    /// Execute a page or cursor query from stdin against a JSON fixture
    #[command(group(ArgGroup::new("mode").required(true).args(["page", "cursor"])))]
    Run {
        /// Path to configuration file
        #[arg(long, default_value = "./docrepo.json")]
        config: PathBuf,

        #[arg(long)]
        entity: String,

        /// JSON array of documents to load
        #[arg(long)]
        data: PathBuf,

        /// Read a page query
        #[arg(long)]
        page: bool,

        /// Read a cursor query
        #[arg(long)]
        cursor: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

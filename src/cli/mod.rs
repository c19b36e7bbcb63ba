//! CLI module for docrepo
//!
//! Provides command-line access to the query compilers:
//! - page: compile an offset page query
//! - cursor: compile a keyset query for one entity
//! - collection: derive a collection name
//! - run: execute a query against a JSON fixture

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{cursor_request, execute_request, init_logging, page_request, run, run_command};
pub use config::{BackendConfig, Config, EntityConfig};
pub use errors::{CliError, CliResult};
pub use io::{error_envelope, ok_envelope, read_fixture, write_error, write_response};

//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit after an error
//! envelope is written.

use std::io;

use thiserror::Error;

use crate::errors::RepoError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file missing, unreadable or invalid
    #[error("Config error: {0}")]
    Config(String),

    /// stdin/stdout or fixture file failure
    #[error("I/O error: {0}")]
    Io(String),

    /// Request on stdin could not be parsed
    #[error("Invalid input: {0}")]
    Input(String),

    /// Planning or execution failed
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        CliError::Io(msg.into())
    }

    pub fn input_error(msg: impl Into<String>) -> Self {
        CliError::Input(msg.into())
    }

    /// Error code for the envelope. Repository errors keep their own code.
    pub fn code_str(&self) -> &'static str {
        match self {
            CliError::Config(_) => "DOCREPO_CLI_CONFIG_ERROR",
            CliError::Io(_) => "DOCREPO_CLI_IO_ERROR",
            CliError::Input(_) => "DOCREPO_CLI_INPUT_ERROR",
            CliError::Repo(e) => e.code(),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::input_error(format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

//! JSON I/O handling for CLI
//!
//! - Input: single JSON object on one stdin line
//! - Output: single JSON envelope on stdout
//! - Logs go to stderr, never stdout

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::errors::{CliError, CliResult};
use crate::mapper::RawRecord;

/// Read one JSON request line from stdin
pub fn read_request<T: DeserializeOwned>() -> CliResult<T> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    parse_request(&line)
}

/// Parses one request line
pub fn parse_request<T: DeserializeOwned>(line: &str) -> CliResult<T> {
    if line.trim().is_empty() {
        return Err(CliError::input_error("Empty input"));
    }
    Ok(serde_json::from_str(line)?)
}

/// Reads a fixture file holding a JSON array of documents
pub fn read_fixture(path: &Path) -> CliResult<Vec<RawRecord>> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;

    let documents: Vec<RawRecord> = serde_json::from_str(&content).map_err(|e| {
        CliError::input_error(format!(
            "{} must hold a JSON array of objects: {}",
            path.display(),
            e
        ))
    })?;
    Ok(documents)
}

/// Success envelope
pub fn ok_envelope<T: Serialize>(data: &T) -> CliResult<Value> {
    Ok(json!({
        "status": "ok",
        "data": serde_json::to_value(data)?
    }))
}

/// Error envelope
pub fn error_envelope(error: &CliError) -> Value {
    json!({
        "status": "error",
        "code": error.code_str(),
        "message": error.to_string()
    })
}

/// Write a success response to stdout
pub fn write_response<T: Serialize>(data: &T) -> CliResult<()> {
    write_value(&ok_envelope(data)?)
}

/// Write an error response to stdout
pub fn write_error(error: &CliError) -> CliResult<()> {
    write_value(&error_envelope(error))
}

fn write_value(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

//! CLI command implementations
//!
//! Each command reads at most one request line from stdin and writes exactly
//! one envelope to stdout. The `*_request` functions hold the logic and take
//! the request text directly so they can be tested without a terminal.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_fixture, read_request, write_error, write_response};
use crate::compiler::{CursorQueryPlanner, PageQueryPlanner};
use crate::mapper::RawRecord;
use crate::query::{CursorQuery, PageQuery};
use crate::repository::{MemoryBackend, Repository};
use crate::schema::{collection_name_for, EntitySchema, NameCache};

/// Main CLI entry point
///
/// Parses arguments, installs logging and dispatches. Failures are reported
/// as an error envelope before being returned.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let result = run_command(cli.command);
    if let Err(e) = &result {
        write_error(e)?;
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Page { config } => page(&config),
        Command::Cursor { config, entity } => cursor(&config, &entity),
        Command::Collection { type_name } => {
            init_logging("warn");
            write_response(&collection_name_for(&type_name))
        }
        Command::Run {
            config,
            entity,
            data,
            page,
            ..
        } => run_fixture(&config, &entity, &data, page),
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `fallback`.
pub fn init_logging(fallback: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

    // A second install (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    init_logging(&config.log_level);
    debug!(path = %config_path.display(), entities = config.entities.len(), "loaded config");
    Ok(config)
}

/// Compile a page query from stdin
pub fn page(config_path: &Path) -> CliResult<()> {
    let config = load(config_path)?;
    let request: Value = read_request()?;
    write_response(&page_request(&config, request)?)
}

/// Compile a cursor query from stdin
pub fn cursor(config_path: &Path, entity: &str) -> CliResult<()> {
    let config = load(config_path)?;
    let request: Value = read_request()?;
    write_response(&cursor_request(&config, entity, request)?)
}

/// Execute a query from stdin against a fixture
pub fn run_fixture(config_path: &Path, entity: &str, data: &Path, page_mode: bool) -> CliResult<()> {
    let config = load(config_path)?;
    let documents = read_fixture(data)?;
    let request: Value = read_request()?;
    write_response(&execute_request(&config, entity, documents, request, page_mode)?)
}

/// Page query JSON → search DSL
pub fn page_request(config: &Config, request: Value) -> CliResult<Value> {
    let query: PageQuery = from_request(request)?;
    let compiler = config.filter_compiler();
    let search = PageQueryPlanner::new(&compiler).plan(&query)?;
    Ok(search.to_dsl())
}

/// Cursor query JSON → search DSL
pub fn cursor_request(config: &Config, entity: &str, request: Value) -> CliResult<Value> {
    let schema = config.entity(entity, &NameCache::new())?;
    let query: CursorQuery = from_request(request)?;
    let compiler = config.filter_compiler();
    let (search, _) = CursorQueryPlanner::new(&compiler).plan(&query, &schema)?;

    Ok(serde_json::json!({
        "index": schema.collection_name(),
        "body": search.to_dsl()
    }))
}

/// Runs a page or cursor query end to end over the in-memory backend
pub fn execute_request(
    config: &Config,
    entity: &str,
    documents: Vec<RawRecord>,
    request: Value,
    page_mode: bool,
) -> CliResult<Value> {
    let names = std::sync::Arc::new(NameCache::new());
    let schema = config.entity(entity, &names)?;

    let backend = MemoryBackend::with_exact_suffix(config.exact_suffix.clone());
    let loaded = backend.load(schema.collection_name(), schema.identifier_field(), documents);
    info!(collection = schema.collection_name(), loaded, "loaded fixture");

    let repo = Repository::with_parts(backend, names, config.filter_compiler());

    if page_mode {
        let query: PageQuery = from_request(request)?;
        to_value(&repo.page_in::<RawRecord>(&schema, &query)?)
    } else {
        let query: CursorQuery = from_request(request)?;
        to_value(&repo.cursor_in::<RawRecord>(&schema, &query)?)
    }
}

fn from_request<T: serde::de::DeserializeOwned>(request: Value) -> CliResult<T> {
    serde_json::from_value(request).map_err(|e| CliError::input_error(e.to_string()))
}

fn to_value<T: Serialize>(value: &T) -> CliResult<Value> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::io::parse_request;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config() -> Config {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({
                "backend": {"addresses": ["http://localhost:9200"], "username": "u", "password": "p"},
                "exact_suffix": "exact",
                "entities": {"Event": {"attributes": ["id", "kind", "ctime"]}}
            })
        )
        .unwrap();
        Config::load(file.path()).unwrap()
    }

    fn fixture() -> Vec<RawRecord> {
        (1..=5)
            .map(|i| match json!({"id": format!("e{}", i), "kind": "click", "ctime": i * 100}) {
                Value::Object(map) => map,
                _ => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn test_page_request_dsl() {
        let request = parse_request(
            r#"{"filters": {"kind": "click"}, "sort": [{"property": "ctime", "direction": "desc"}], "pageNo": 2, "pageSize": 10}"#,
        )
        .unwrap();
        let dsl = page_request(&config(), request).unwrap();

        assert_eq!(
            dsl,
            json!({
                "query": {"bool": {"must": [{"term": {"kind.exact": "click"}}]}},
                "from": 10,
                "size": 10,
                "sort": [{"ctime": "desc"}]
            })
        );
    }

    #[test]
    fn test_cursor_request_dsl() {
        let out = cursor_request(
            &config(),
            "Event",
            json!({"cursorSort": {"property": "ctime"}, "cursor": 300, "size": 2, "direction": "forward"}),
        )
        .unwrap();

        assert_eq!(out["index"], "events");
        assert_eq!(
            out["body"],
            json!({
                "query": {"bool": {"must": [{"range": {"ctime": {"gt": 300}}}]}},
                "size": 2,
                "sort": [{"ctime": "asc"}]
            })
        );
    }

    #[test]
    fn test_cursor_request_unknown_property() {
        let err = cursor_request(
            &config(),
            "Event",
            json!({"cursorSort": {"property": "mtime"}, "cursor": 300, "size": 2}),
        )
        .unwrap_err();
        assert_eq!(err.code_str(), "REPO_VALIDATION");
    }

    #[test]
    fn test_invalid_request_shape() {
        let err = page_request(&config(), json!({"pageNo": "one"})).unwrap_err();
        assert_eq!(err.code_str(), "DOCREPO_CLI_INPUT_ERROR");
    }

    #[test]
    fn test_execute_cursor_backward() {
        let out = execute_request(
            &config(),
            "Event",
            fixture(),
            json!({"cursorSort": {"property": "ctime"}, "cursor": 400, "size": 2, "direction": 0}),
            false,
        )
        .unwrap();

        assert_eq!(out["extra"]["direction"], "backward");
        assert_eq!(out["extra"]["minCursor"], 200);
        assert_eq!(out["extra"]["maxCursor"], 300);
        assert_eq!(out["extra"]["hasMore"], true);
        assert_eq!(out["items"][0]["id"], "e2");
    }

    #[test]
    fn test_execute_page() {
        let out = execute_request(
            &config(),
            "Event",
            fixture(),
            json!({"filters": {"ctime": {"GTE": 200}}, "sort": [{"property": "ctime"}], "pageNo": 2, "pageSize": 3}),
            true,
        )
        .unwrap();

        assert_eq!(out["total"], 4);
        assert_eq!(out["pageCount"], 1);
        assert_eq!(out["items"][0]["id"], "e5");
    }
}

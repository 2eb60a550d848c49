//! CLI command implementations
//!
//! Every command follows the same boot sequence:
//! 1. Configuration load and validation
//! 2. Log threshold applied
//! 3. Dataset snapshots loaded into a fresh [`QueryService`]
//!
//! Query rejections are written as error responses on stdout; only boot and
//! I/O failures surface as [`CliError`].

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::{record_from_json, Dataset, DatasetKind, Record};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::service::QueryService;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, read_requests, write_error, write_response};

/// One dataset snapshot to load at boot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSource {
    /// Dataset id, the prefix of every query key that targets it
    pub id: String,
    pub kind: DatasetKind,
    /// JSON array of record objects. Relative paths resolve against the
    /// config file's directory.
    pub path: PathBuf,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Datasets to load (required, may be empty)
    pub datasets: Vec<DatasetSource>,

    /// Minimum log severity (optional, default "INFO")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_log_level() -> String {
    Severity::Info.as_str().to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        self.severity()?;

        let mut seen = HashSet::new();
        for source in &self.datasets {
            if !seen.insert(source.id.as_str()) {
                return Err(CliError::config_error(format!(
                    "Duplicate dataset id: '{}'",
                    source.id
                )));
            }
        }

        Ok(())
    }

    /// Parsed log threshold
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(|e: String| {
            CliError::config_error(format!("Invalid log_level: {}", e))
        })
    }

    /// Snapshot path with relative paths resolved
    pub fn resolve(&self, source: &DatasetSource) -> PathBuf {
        if source.path.is_absolute() {
            source.path.clone()
        } else {
            self.base_dir.join(&source.path)
        }
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query { config } => query(&config),
        Command::Serve { config } => serve(&config),
        Command::List { config } => list(&config),
    }
}

/// Run a single query read from stdin and exit
pub fn query(config_path: &Path) -> CliResult<()> {
    let service = boot(config_path)?;
    let request = read_request()?;
    respond(&service, &request)
}

/// Answer queries from stdin, one per line, until EOF
pub fn serve(config_path: &Path) -> CliResult<()> {
    let service = boot(config_path)?;

    for request in read_requests() {
        match request {
            Ok(request) => respond(&service, &request)?,
            Err(e) => {
                // Malformed lines are reported and skipped; a read failure ends the stream
                write_error(e.code_str(), e.message())?;
            }
        }
    }

    Ok(())
}

/// Print a summary of every configured dataset
pub fn list(config_path: &Path) -> CliResult<()> {
    let service = boot(config_path)?;
    write_response(serde_json::to_value(service.list_datasets())?)
}

fn respond(service: &QueryService, request: &Value) -> CliResult<()> {
    match service.perform_query(request) {
        Ok(rows) => write_response(serde_json::to_value(rows)?),
        Err(e) => write_error(e.code().code(), e.message()),
    }
}

/// Loads config and datasets into a new service
pub fn boot(config_path: &Path) -> CliResult<QueryService> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("config", &config_path.display().to_string()),
            ("datasets", &config.datasets.len().to_string()),
        ],
    );

    let service = QueryService::new();
    for source in &config.datasets {
        let entries = load_entries(&config.resolve(source))?;
        let dataset = Dataset::new(source.id.as_str(), source.kind, entries)?;
        service.add_dataset(dataset)?;
    }

    Ok(service)
}

/// Reads a dataset snapshot: a JSON array of record objects
fn load_entries(path: &Path) -> CliResult<Vec<Record>> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::dataset_load_error(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let parsed: Value = serde_json::from_str(&content).map_err(|e| {
        CliError::dataset_load_error(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;

    let entries = parsed.as_array().ok_or_else(|| {
        CliError::dataset_load_error(format!(
            "{} must contain a JSON array of records",
            path.display()
        ))
    })?;

    Ok(entries.iter().map(record_from_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const ROOMS: &str = r#"[
        {"fullname": "Hugh Dempster Pavilion", "shortname": "DMP", "number": "110",
         "name": "DMP_110", "address": "6245 Agronomy Road V6T 1Z4", "type": "Tiered Large Group",
         "furniture": "Classroom-Fixed Tables/Movable Chairs", "href": "http://x/DMP-110",
         "lat": 49.26125, "lon": -123.24807, "seats": 120},
        {"shortname": "broken"}
    ]"#;

    #[test]
    fn test_config_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "config.json", r#"{"datasets": []}"#);

        let config = Config::load(&path).unwrap();
        assert_eq!(config.log_level, "INFO");
        assert!(config.datasets.is_empty());
    }

    #[test]
    fn test_config_rejects_duplicate_ids() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "config.json",
            r#"{"datasets": [
                {"id": "rooms", "kind": "rooms", "path": "a.json"},
                {"id": "rooms", "kind": "rooms", "path": "b.json"}
            ]}"#,
        );

        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_config_rejects_unknown_level_and_kind() {
        let dir = TempDir::new().unwrap();
        let level = write_file(&dir, "level.json", r#"{"datasets": [], "log_level": "LOUD"}"#);
        assert!(Config::load(&level).is_err());

        let kind = write_file(
            &dir,
            "kind.json",
            r#"{"datasets": [{"id": "x", "kind": "buildings", "path": "x.json"}]}"#,
        );
        assert!(Config::load(&kind).is_err());
    }

    #[test]
    fn test_boot_loads_relative_snapshot() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "rooms.json", ROOMS);
        let config = write_file(
            &dir,
            "config.json",
            r#"{"datasets": [{"id": "campus", "kind": "rooms", "path": "rooms.json"}],
                "log_level": "ERROR"}"#,
        );

        let service = boot(&config).unwrap();
        let summaries = service.list_datasets();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "campus");
        assert_eq!(summaries[0].num_rows, 1);
    }

    #[test]
    fn test_boot_missing_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = write_file(
            &dir,
            "config.json",
            r#"{"datasets": [{"id": "campus", "kind": "rooms", "path": "missing.json"}],
                "log_level": "ERROR"}"#,
        );

        let err = boot(&config).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::DatasetLoadError);
    }

    #[test]
    fn test_boot_rejects_non_array_snapshot() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "rooms.json", r#"{"rooms": []}"#);
        let config = write_file(
            &dir,
            "config.json",
            r#"{"datasets": [{"id": "campus", "kind": "rooms", "path": "rooms.json"}],
                "log_level": "ERROR"}"#,
        );

        let err = boot(&config).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::DatasetLoadError);
    }
}

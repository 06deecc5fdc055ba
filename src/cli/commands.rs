//! CLI command implementations
//!
//! `validate` and `plan` run offline against the in-memory backends. Every
//! other command loads the config, opens a pool and drives the orchestrator
//! inside a tokio runtime.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::database::{connect, MemoryDatabase, PgDdlExecutor};
use crate::http_server::HttpServer;
use crate::metadata::{MemoryMetadataStore, MetadataStore, PgMetadataStore};
use crate::observability::{Event, Logger};
use crate::orchestrator::SchemaOrchestrator;

use super::args::Command;
use super::config::ServiceConfig;
use super::errors::{CliError, CliResult};
use super::io::{read_definition, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config, port } => serve(&config, port),
        Command::Validate { file } => validate(&file),
        Command::Plan { file } => plan(&file),
        Command::Create {
            file,
            creator,
            config,
        } => create(&file, &creator, &config),
        Command::List { config } => list(&config),
        Command::Delete { id, config } => delete(id, &config),
        Command::Orphans { config } => orphans(&config),
    }
}

/// Create the metadata catalog and extensions
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;

    block_on(async {
        let pool = connect(
            &config.database_url,
            config.max_connections,
            config.acquire_timeout(),
        )
        .await?;
        PgMetadataStore::new(pool).ensure_schema().await?;
        Ok::<_, CliError>(())
    })?;

    Logger::event(Event::MetadataSchemaReady, &[]);
    write_response(&json!({"initialized": true}))
}

/// Start the admin HTTP server
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    block_on(async {
        let orchestrator = connect_orchestrator(&config).await?;
        HttpServer::new(config.http.clone(), orchestrator)
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Validate a definition file and print the report
///
/// Fails when the definition has violations so scripts can branch on the
/// exit status.
pub fn validate(file: &Path) -> CliResult<()> {
    let definition = read_definition(file)?;
    let report = offline_orchestrator().validate(&definition);
    write_response(&report)?;

    if report.valid {
        Ok(())
    } else {
        Err(CliError::invalid_definition(&report.errors))
    }
}

/// Print the statements a definition would execute
pub fn plan(file: &Path) -> CliResult<()> {
    let definition = read_definition(file)?;
    let plan = offline_orchestrator().plan(&definition)?;
    write_response(&plan)
}

/// Create a table from a definition file
pub fn create(file: &Path, creator: &str, config_path: &Path) -> CliResult<()> {
    let definition = read_definition(file)?;
    let config = load_config(config_path)?;

    let table = block_on(async {
        let orchestrator = connect_orchestrator(&config).await?;
        Ok::<_, CliError>(orchestrator.create_table(&definition, creator).await?)
    })?;

    write_response(&table)
}

/// List every custom table with its fields
pub fn list(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;

    let tables = block_on(async {
        let orchestrator = connect_orchestrator(&config).await?;
        Ok::<_, CliError>(orchestrator.get_tables().await?)
    })?;

    write_response(&tables)
}

/// Delete a custom table, its history and its metadata
pub fn delete(id: Uuid, config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;

    block_on(async {
        let orchestrator = connect_orchestrator(&config).await?;
        Ok::<_, CliError>(orchestrator.delete_table(id).await?)
    })?;

    write_response(&json!({"deleted": id}))
}

/// Report physical tables with no metadata row
pub fn orphans(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;

    let orphaned = block_on(async {
        let orchestrator = connect_orchestrator(&config).await?;
        Ok::<_, CliError>(orchestrator.find_orphans().await?)
    })?;

    write_response(&orphaned)
}

fn load_config(path: &Path) -> CliResult<ServiceConfig> {
    let config = ServiceConfig::load(path)?;
    Logger::event(
        Event::ConfigLoaded,
        &[
            ("path", &path.display().to_string()),
            ("max_connections", &config.max_connections.to_string()),
        ],
    );
    Ok(config)
}

/// Orchestrator over the in-memory backends; never touches a database.
fn offline_orchestrator() -> SchemaOrchestrator {
    SchemaOrchestrator::new(
        Arc::new(MemoryDatabase::new()),
        Arc::new(MemoryMetadataStore::new()),
    )
}

async fn connect_orchestrator(config: &ServiceConfig) -> CliResult<SchemaOrchestrator> {
    let pool = connect(
        &config.database_url,
        config.max_connections,
        config.acquire_timeout(),
    )
    .await?;

    Ok(SchemaOrchestrator::new(
        Arc::new(PgDdlExecutor::new(pool.clone())),
        Arc::new(PgMetadataStore::new(pool)),
    ))
}

fn block_on<F, T>(future: F) -> CliResult<T>
where
    F: Future<Output = CliResult<T>>,
{
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;
    rt.block_on(future)
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_definition(dir: &TempDir, body: serde_json::Value) -> std::path::PathBuf {
        let path = dir.path().join("definition.json");
        fs::write(&path, body.to_string()).unwrap();
        path
    }

    #[test]
    fn test_validate_accepts_valid_definition() {
        let dir = TempDir::new().unwrap();
        let path = write_definition(
            &dir,
            json!({
                "name": "widgets",
                "displayName": "Widgets",
                "fields": [{"name": "sku", "displayName": "SKU", "dataType": "VARCHAR",
                            "maxLength": 20, "order": 0}]
            }),
        );

        validate(&path).unwrap();
        plan(&path).unwrap();
    }

    #[test]
    fn test_validate_rejects_invalid_definition() {
        let dir = TempDir::new().unwrap();
        let path = write_definition(
            &dir,
            json!({"name": "Bad Name", "displayName": "", "fields": []}),
        );

        let err = validate(&path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidDefinition);

        let err = plan(&path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidDefinition);
    }

    #[test]
    fn test_commands_require_config() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");

        let err = list(&missing).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }
}

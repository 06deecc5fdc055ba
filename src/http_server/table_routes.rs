//! Custom table HTTP routes
//!
//! Admin endpoints over the schema orchestrator, nested under `/tables`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::metadata::{CustomField, CustomTableWithFields, OrphanedTable};
use crate::orchestrator::{SchemaOrchestrator, TableError};
use crate::schema::{FieldDefinition, TableDefinition, ValidationReport};

/// Header carrying the caller's identity
pub const USER_ID_HEADER: &str = "x-user-id";
/// Creator recorded when no identity is supplied
pub const DEFAULT_CREATOR: &str = "system";

/// Tables state shared across handlers
pub struct TablesState {
    pub orchestrator: SchemaOrchestrator,
}

impl TablesState {
    pub fn new(orchestrator: SchemaOrchestrator) -> Self {
        Self { orchestrator }
    }
}

#[derive(Debug, Serialize)]
pub struct TablesListResponse {
    pub tables: Vec<CustomTableWithFields>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct OrphansResponse {
    pub orphans: Vec<OrphanedTable>,
    pub total: usize,
}

/// Create table routes
pub fn table_routes(state: Arc<TablesState>) -> Router {
    Router::new()
        .route("/", get(list_tables_handler).post(create_table_handler))
        .route("/validate", post(validate_table_handler))
        .route("/orphans", get(orphans_handler))
        .route("/by-name/:name", get(get_table_by_name_handler))
        .route("/:id", get(get_table_handler).delete(delete_table_handler))
        .route("/:id/fields", post(add_field_handler))
        .with_state(state)
}

fn creator_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_CREATOR)
        .to_string()
}

async fn list_tables_handler(
    State(state): State<Arc<TablesState>>,
) -> Result<Json<TablesListResponse>, TableError> {
    let tables = state.orchestrator.get_tables().await?;
    Ok(Json(TablesListResponse {
        total: tables.len(),
        tables,
    }))
}

async fn create_table_handler(
    State(state): State<Arc<TablesState>>,
    headers: HeaderMap,
    Json(definition): Json<TableDefinition>,
) -> Result<(StatusCode, Json<CustomTableWithFields>), TableError> {
    let creator = creator_from_headers(&headers);
    let table = state
        .orchestrator
        .create_table(&definition, &creator)
        .await?;
    Ok((StatusCode::CREATED, Json(table)))
}

async fn validate_table_handler(
    State(state): State<Arc<TablesState>>,
    Json(definition): Json<TableDefinition>,
) -> Json<ValidationReport> {
    Json(state.orchestrator.validate(&definition))
}

async fn orphans_handler(
    State(state): State<Arc<TablesState>>,
) -> Result<Json<OrphansResponse>, TableError> {
    let orphans = state.orchestrator.find_orphans().await?;
    Ok(Json(OrphansResponse {
        total: orphans.len(),
        orphans,
    }))
}

async fn get_table_handler(
    State(state): State<Arc<TablesState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomTableWithFields>, TableError> {
    state
        .orchestrator
        .get_table_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| TableError::TableNotFound(id.to_string()))
}

async fn get_table_by_name_handler(
    State(state): State<Arc<TablesState>>,
    Path(name): Path<String>,
) -> Result<Json<CustomTableWithFields>, TableError> {
    state
        .orchestrator
        .get_table_by_name(&name)
        .await?
        .map(Json)
        .ok_or(TableError::TableNotFound(name))
}

async fn delete_table_handler(
    State(state): State<Arc<TablesState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, TableError> {
    state.orchestrator.delete_table(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_field_handler(
    State(state): State<Arc<TablesState>>,
    Path(id): Path<Uuid>,
    Json(field): Json<FieldDefinition>,
) -> Result<(StatusCode, Json<CustomField>), TableError> {
    let field = state.orchestrator.add_field_to_table(id, &field).await?;
    Ok((StatusCode::CREATED, Json(field)))
}

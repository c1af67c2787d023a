//! HTTP handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use common::errors::{AppError, AppResult};
use common::models::{
    ConceptDetails, ConceptSummary, ConnectResult, ConnectionParams, ConnectionStatus,
    StructureDetails, StructureNode,
};
use common::response::ApiResponse;

use crate::hierarchy::parse_structure_id;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "atlas-service";

/// Free-text search term.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Substring to match, case-insensitive.
    pub query: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HierarchyQuery {
    /// Hierarchy model to traverse; defaults to the first model touching the structure.
    pub hierarchy_model: Option<String>,
}

/// Opens the shared pool with the given credentials.
#[utoipa::path(
    post,
    path = "/api/connect",
    tag = "connection",
    request_body = ConnectionParams,
    responses(
        (status = 200, description = "Connected", body = ApiResponse<ConnectResult>),
        (status = 400, description = "Missing connection field"),
        (status = 500, description = "Connection failed")
    )
)]
pub async fn connect(
    State(state): State<AppState>,
    Json(params): Json<ConnectionParams>,
) -> AppResult<Json<ApiResponse<ConnectResult>>> {
    params.validate()?;
    state.pool_manager.connect(params).await?;
    Ok(Json(ApiResponse::ok_with_service(
        ConnectResult::connected(),
        SERVICE_NAME,
    )))
}

/// Last known connection state. Does not touch the database.
#[utoipa::path(
    get,
    path = "/api/connection_status",
    tag = "connection",
    responses(
        (status = 200, description = "Connection flag", body = ApiResponse<ConnectionStatus>)
    )
)]
pub async fn connection_status(
    State(state): State<AppState>,
) -> Json<ApiResponse<ConnectionStatus>> {
    Json(ApiResponse::ok_with_service(
        ConnectionStatus {
            connected: state.pool_manager.is_connected(),
        },
        SERVICE_NAME,
    ))
}

#[utoipa::path(
    get,
    path = "/api/search",
    tag = "concepts",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching concepts", body = ApiResponse<Vec<ConceptSummary>>),
        (status = 503, description = "Database not connected")
    )
)]
pub async fn search_concepts(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<Vec<ConceptSummary>>>> {
    let data = state.catalog().await?.search_concepts(&q.query).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

#[utoipa::path(
    get,
    path = "/api/concept/{concept_id}",
    tag = "concepts",
    params(
        ("concept_id" = String, Path, description = "Concept id")
    ),
    responses(
        (status = 200, description = "Concept details", body = ApiResponse<ConceptDetails>),
        (status = 404, description = "Concept not found"),
        (status = 503, description = "Database not connected")
    )
)]
pub async fn concept_details(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
) -> AppResult<Json<ApiResponse<ConceptDetails>>> {
    let data = state
        .catalog()
        .await?
        .concept_details(&concept_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Concept not found".into()))?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

#[utoipa::path(
    get,
    path = "/api/brain-search",
    tag = "structures",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching structures", body = ApiResponse<Vec<StructureNode>>),
        (status = 503, description = "Database not connected")
    )
)]
pub async fn search_structures(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<Vec<StructureNode>>>> {
    let data = state.catalog().await?.search_structures(&q.query).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Structure attributes with its full ancestor and descendant trees.
#[utoipa::path(
    get,
    path = "/api/brain-structure/{structure_id}",
    tag = "structures",
    params(
        ("structure_id" = String, Path, description = "Integer structure id"),
        HierarchyQuery
    ),
    responses(
        (status = 200, description = "Structure details", body = ApiResponse<StructureDetails>),
        (status = 400, description = "Structure id is not an integer"),
        (status = 404, description = "Brain structure not found"),
        (status = 503, description = "Database not connected")
    )
)]
pub async fn structure_details(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(q): Query<HierarchyQuery>,
) -> AppResult<Json<ApiResponse<StructureDetails>>> {
    let structure_id = parse_structure_id(&raw_id)?;
    let data = state
        .hierarchy()
        .await?
        .structure_details(structure_id, q.hierarchy_model.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("Brain structure not found".into()))?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

#[utoipa::path(
    get,
    path = "/api/hierarchy-models",
    tag = "structures",
    responses(
        (status = 200, description = "All hierarchy model names", body = ApiResponse<Vec<String>>),
        (status = 503, description = "Database not connected")
    )
)]
pub async fn hierarchy_models(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    let data = state.catalog().await?.hierarchy_models().await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        database_connected: state.pool_manager.is_connected(),
    })
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
    /// Last known database connection state
    pub database_connected: bool,
}

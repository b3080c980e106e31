//! Diagram CRUD, batch modification and export routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use diagram::export::{ExportFormat, export};
use diagram::modification::decode_entries;
use diagram::{CommandReport, Diagram, RejectedEntry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Owner;
use crate::error::ApiError;
use crate::services::diagram::{self as service, DiagramSummary};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateDiagramBody {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameDiagramBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
    #[serde(default)]
    pub modifications: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub diagram: Diagram,
    pub reports: Vec<CommandReport>,
    pub rejected: Vec<RejectedEntry>,
}

/// Unwrap a JSON body, turning axum's rejection into our error body.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// `GET /api/diagrams`: list the caller's diagrams.
pub async fn list(State(state): State<AppState>, Owner(owner): Owner) -> Result<Json<Vec<DiagramSummary>>, ApiError> {
    Ok(Json(service::list_diagrams(&state, &owner).await?))
}

/// `POST /api/diagrams`: create an empty diagram.
pub async fn create(
    State(state): State<AppState>,
    Owner(owner): Owner,
    body: Option<Json<CreateDiagramBody>>,
) -> Result<(StatusCode, Json<Diagram>), ApiError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let diagram = service::create_diagram(&state, &owner, body.name.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(diagram)))
}

/// `GET /api/diagrams/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<Diagram>, ApiError> {
    Ok(Json(service::get_diagram(&state, &owner, id).await?))
}

/// `PUT /api/diagrams/{id}`: replace the whole document.
pub async fn replace(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
    body: Result<Json<Diagram>, JsonRejection>,
) -> Result<Json<Diagram>, ApiError> {
    let submitted = json_body(body)?;
    Ok(Json(service::replace_diagram(&state, &owner, id, submitted).await?))
}

/// `PATCH /api/diagrams/{id}`: rename.
pub async fn rename(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
    body: Result<Json<RenameDiagramBody>, JsonRejection>,
) -> Result<Json<Diagram>, ApiError> {
    let body = json_body(body)?;
    Ok(Json(service::rename_diagram(&state, &owner, id, &body.name).await?))
}

/// `DELETE /api/diagrams/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service::delete_diagram(&state, &owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/diagrams/{id}/modifications`: apply a batch.
///
/// Entries that fail to decode are returned in `rejected`; the rest are
/// applied in order.
pub async fn apply(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
    body: Result<Json<BatchBody>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let batch = decode_entries(json_body(body)?.modifications);
    let outcome = service::apply_batch(&state, &owner, id, &batch.modifications).await?;
    Ok(Json(BatchResponse { diagram: outcome.diagram, reports: outcome.reports, rejected: batch.rejected }))
}

/// `GET /api/diagrams/{id}/export/mermaid`
pub async fn export_mermaid(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    export_file(&state, &owner, id, ExportFormat::Mermaid).await
}

/// `GET /api/diagrams/{id}/export/bpmn`
pub async fn export_bpmn(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    export_file(&state, &owner, id, ExportFormat::Bpmn).await
}

async fn export_file(state: &AppState, owner: &str, id: Uuid, format: ExportFormat) -> Result<Response, ApiError> {
    let diagram = service::get_diagram(state, owner, id).await?;
    let file = export(&diagram, format);
    tracing::info!(%owner, diagram_id = %id, filename = %file.filename, bytes = file.content.len(), "export: generated");

    Ok((
        [
            (CONTENT_TYPE, format!("{}; charset=utf-8", file.mime_type)),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file.filename)),
        ],
        file.content,
    )
        .into_response())
}

#[cfg(test)]
#[path = "diagrams_test.rs"]
mod tests;

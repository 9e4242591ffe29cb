use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::UploadedDocument;
use crate::session::models::SessionView;
use crate::session::orchestrator::{ApplyResponse, ResumeSource};
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";
const JOB_DESCRIPTION_FIELD: &str = "job_description";

#[derive(Deserialize)]
pub struct TextAnalysisRequest {
    pub resume_text: String,
    pub job_description: String,
}

/// POST /api/v1/analyses
/// Multipart form: `resume` (file) and `job_description` (text).
pub async fn handle_submit_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let mut document = None;
    let mut job_description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some(RESUME_FIELD) => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read resume file: {e}")))?;
                document = Some(UploadedDocument {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some(JOB_DESCRIPTION_FIELD) => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Could not read job_description: {e}"))
                })?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    let document = document
        .ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;
    let job_description = job_description.unwrap_or_default();

    let view = state
        .orchestrator
        .submit(ResumeSource::Document(document), &job_description)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /api/v1/analyses/text
pub async fn handle_submit_text(
    State(state): State<AppState>,
    Json(req): Json<TextAnalysisRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let view = state
        .orchestrator
        .submit(ResumeSource::Text(req.resume_text), &req.job_description)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.orchestrator.view(id).await?))
}

/// POST /api/v1/sessions/:id/rewrites/:index/apply
pub async fn handle_apply_rewrite(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<ApplyResponse>, AppError> {
    Ok(Json(state.orchestrator.apply_rewrite(id, index).await?))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.orchestrator.reset(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:id/export
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let exported = state.orchestrator.export(id).await?;
    let disposition = "attachment; filename=\"resume.pdf\"";
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, exported.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        exported.bytes,
    ))
}

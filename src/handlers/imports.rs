use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::imports::LineError;
use crate::services::importer;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub imported: usize,
    pub skipped: Vec<LineError>,
}

/// Multipart inventory upload: a plain-text `file` field, one card per
/// line as `<quantity> <name> (<edition>) <id>`.
pub async fn upload_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut content = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Unreadable upload: {}", e)))?;
            content = Some(text);
            break;
        }
    }

    let content =
        content.ok_or_else(|| AppError::BadRequest("Missing 'file' field".to_string()))?;

    let outcome = importer::import_inventory(&state.db, &state.card_api, &user, &content).await?;

    Ok(Json(UploadResponse {
        imported: outcome.imported,
        skipped: outcome.skipped,
    }))
}

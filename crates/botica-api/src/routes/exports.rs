use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use botica_core::export_keys;
use botica_export::format::ExportFormat;
use botica_export::render::ExportDocument;
use botica_export::styles::DocumentStyles;
use botica_storage::objects;
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::recommendations::{find_one, parse_id};
use crate::state::AppState;

pub const EXPORT_KEY_HEADER: &str = "x-export-key";

#[derive(Deserialize)]
pub struct ExportRequest {
    pub format: String,
}

/// Export a stored recommendation as DOCX or text. The artifact is also
/// uploaded when an export bucket is configured.
pub async fn export_recommendation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let Json(req) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let format: ExportFormat = req.format.parse()?;

    let stored = find_one(&state, id).await?;
    let document = ExportDocument::from(&stored);
    let artifact = botica_export::export(&document, format, &DocumentStyles::default())?;

    let uploaded_key = match &state.exports {
        Some(target) => {
            let key = match format {
                ExportFormat::Docx => export_keys::recommendation_docx(id),
                ExportFormat::Text => export_keys::recommendation_text(id),
            };
            objects::put_object(
                &target.s3,
                &target.bucket,
                &key,
                artifact.bytes.clone(),
                Some(artifact.content_type()),
            )
            .await?;
            Some(key)
        }
        None => None,
    };

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    let content_type = artifact.content_type();
    let mut response = artifact.bytes.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if let Some(key) = uploaded_key
        && let Ok(value) = HeaderValue::from_str(&key)
    {
        headers.insert(EXPORT_KEY_HEADER, value);
    }
    Ok(response)
}

use axum::extract::{Multipart, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{AnalysisResponse, AppState};
use crate::pipeline::extraction::Document;

/// `POST /api/documents/analyze` — multipart upload of one document,
/// returning the full ordered analysis.
///
/// The document exists only for the duration of this request: bytes in,
/// analysis out, nothing persisted.
pub async fn analyze_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let document = read_document_part(&mut multipart).await?;

    let result = state.pipeline.run(&document).await.map_err(ApiError::from)?;

    Ok(Json(AnalysisResponse::from_result(
        &document.file_name,
        &result,
    )))
}

/// Pull the uploaded file out of the multipart body. The original client
/// sends the part named `pdf`; any file-bearing part is accepted.
async fn read_document_part(multipart: &mut Multipart) -> Result<Document, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("unreadable multipart body: {e}")))?
    {
        let is_file_part = field.file_name().is_some()
            || matches!(field.name(), Some("pdf") | Some("file") | Some("document"));
        if !is_file_part {
            continue;
        }

        let file_name = sanitize_file_name(field.file_name().unwrap_or("document"));
        let declared_type = field.content_type().map(|t| t.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("unreadable file part: {e}")))?;

        return Ok(Document::new(file_name, declared_type, bytes.to_vec()));
    }

    Err(ApiError::BadRequest(
        "request carries no file part".to_string(),
    ))
}

/// Strip path components and control characters from a client-supplied
/// file name.
fn sanitize_file_name(original: &str) -> String {
    let name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("document");

    let clean: String = name
        .chars()
        .filter(|c| !c.is_control())
        .take(255)
        .collect();

    if clean.is_empty() {
        "document".to_string()
    } else {
        clean
    }
}

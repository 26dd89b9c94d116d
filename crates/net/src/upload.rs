use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use ratezilla_database::basic_db::SafeDatabase;
use ratezilla_service::logo::sniff_content_type;
use ratezilla_service::model::StoredLogo;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct FilenameQuery {
    pub filename: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub pathname: String,
    pub content_type: String,
}

/// Stores an uploaded logo under the given filename. The image type is
/// sniffed from the bytes, the multipart content type is ignored.
pub async fn upload_logo<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Query(query): Query<FilenameQuery>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let filename = query
        .filename
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| {
            ApiError::Validation("Filename is required as a query parameter".to_string())
        })?;

    let mut content: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            content = Some(bytes.to_vec());
            break;
        }
    }

    let bytes = content.filter(|b| !b.is_empty()).ok_or_else(|| {
        ApiError::Validation("No file content found in request body".to_string())
    })?;
    let content_type = sniff_content_type(&bytes)
        .ok_or_else(|| ApiError::Validation("Unsupported image format".to_string()))?;

    let logo = StoredLogo {
        content_type: content_type.to_string(),
        bytes,
    };
    state.store.save_logo(&filename, &logo)?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: format!("/api/logos/{filename}"),
            pathname: filename,
            content_type: content_type.to_string(),
        }),
    ))
}

pub async fn serve_logo<T: SafeDatabase>(
    State(state): State<AppState<T>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let logo = state.store.get_logo(&filename)?;
    Ok(([(header::CONTENT_TYPE, logo.content_type)], logo.bytes).into_response())
}

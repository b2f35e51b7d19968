use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use chrono::Utc;
use tracing::error;
use uuid::Uuid;

use plaza_store::UploadError;
use plaza_types::api::UploadResponse;
use plaza_types::models::ChatMessage;

use crate::auth::AppState;
use crate::middleware::Claims;
use crate::textproc::html_escape;

/// POST `/upload`: file sharing into the chat, answering JSON rather than a
/// rendered page. A successful upload also appends a chat message linking to
/// the stored file.
pub async fn upload(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, StatusCode> {
    let mut saw_file_part = false;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() == Some("file") {
            saw_file_part = true;
            let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
            let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            if !filename.is_empty() {
                file = Some((filename, data.to_vec()));
            }
        }
    }

    if !saw_file_part {
        return Ok(Json(UploadResponse::error("No file part")));
    }
    let Some((original, data)) = file else {
        return Ok(Json(UploadResponse::error("No selected file")));
    };

    let stored = match state.uploads.store(&claims.sub, &original, &data).await {
        Ok(stored) => stored,
        Err(UploadError::Io(e)) => {
            error!("upload write failed: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        // Validation failures come back as a structured error, and nothing
        // was written.
        Err(e) => return Ok(Json(UploadResponse::error(&e.to_string()))),
    };

    let message = ChatMessage {
        id: Uuid::new_v4(),
        content: format!(
            "<a href=\"/static/uploads/{stored}\" target=\"_blank\">Uploaded file: {}</a>",
            html_escape(&original),
        ),
        author: claims.sub.clone(),
        created_at: Utc::now(),
    };
    state
        .messages
        .update(|messages| messages.push(message))
        .map_err(|e| {
            error!("chat store error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(UploadResponse::success(stored)))
}

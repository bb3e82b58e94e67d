//! Serves the built single-page app from the static directory.

use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    extract::State,
    http::{Uri, header},
    response::{Html, IntoResponse, Response},
};

use super::api::{ApiError, SharedState};

/// Serve a file from the static dir or fall back to index.html for SPA routing.
pub async fn static_handler(
    State(state): State<SharedState>,
    uri: Uri,
) -> Result<Response, ApiError> {
    let path = uri.path().trim_start_matches('/');

    let Some(relative) = sanitize_path(path) else {
        return Err(ApiError::BadRequest("Invalid path".to_string()));
    };

    if !state.static_dir.is_dir() {
        return Err(ApiError::NotFound("Not found".to_string()));
    }

    if !relative.as_os_str().is_empty() {
        let file_path = state.static_dir.join(&relative);
        if file_path.is_file() {
            return serve_file(&file_path).await;
        }
    }

    let index_path = state.static_dir.join("index.html");
    if !index_path.is_file() {
        return Err(ApiError::NotFound("Not found".to_string()));
    }
    let content = tokio::fs::read(&index_path).await.map_err(|e| {
        tracing::error!("Failed to read {}: {}", index_path.display(), e);
        ApiError::Internal("Failed to read index.html".to_string())
    })?;
    Ok(Html(content).into_response())
}

async fn serve_file(path: &Path) -> Result<Response, ApiError> {
    let content = tokio::fs::read(path).await.map_err(|e| {
        tracing::error!("Failed to read {}: {}", path.display(), e);
        ApiError::Internal("Failed to read file".to_string())
    })?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(content))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Turn a request path into a relative filesystem path.
///
/// Returns `None` when a segment is `..`, plain or percent-encoded.
/// Backslashes count as separators.
fn sanitize_path(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in path.split(['/', '\\']) {
        match segment.to_ascii_lowercase().replace("%2e", ".").as_str() {
            "" | "." => continue,
            ".." => return None,
            _ => relative.push(segment),
        }
    }
    Some(relative)
}

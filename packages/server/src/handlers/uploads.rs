use atlas_common::storage::ImageFormat;
use atlas_common::storage::naming::validate_flat_filename;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Stream an uploaded image from the content directory.
#[instrument(skip(state))]
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let name = validate_flat_filename(&filename)
        .map_err(|e| AppError::Validation(e.message().into()))?;

    let size = state.image_store.size(name).await?;
    let reader = state.image_store.get_stream(name).await?;
    let content_type = match ImageFormat::of_filename(name) {
        Some(format) => format.mime().to_string(),
        None => mime_guess::from_path(name)
            .first_or_octet_stream()
            .to_string(),
    };

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(e.to_string()))
}

use std::path::PathBuf;

use atlas_common::storage::{AcceptedImage, BoxReader, ImageStore, check_image};
use axum::extract::multipart::Field;
use axum::extract::{FromRequest, Multipart, Request};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Multipart body of create and update requests: a `name` text field and an
/// `image` file field, both optional at this stage.
///
/// The image has already passed the type allow-list and the size limit, but is
/// only staged; handlers decide whether to commit it to the image store.
pub struct CountryForm {
    pub name: Option<String>,
    pub image: Option<StagedImage>,
}

impl FromRequest<AppState> for CountryForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        let max_size = state.config.storage.max_upload_size;

        let mut form = CountryForm {
            name: None,
            image: None,
        };

        while let Some(field) = multipart.next_field().await? {
            match field.name() {
                Some("name") => {
                    form.name = Some(field.text().await?);
                }
                Some("image") => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    // An untouched file input is submitted as an empty, nameless part.
                    if filename.is_empty() {
                        continue;
                    }
                    let AcceptedImage { format, extension } =
                        check_image(&filename, field.content_type())?;
                    let staged = StagedImage::stage(field, extension, max_size).await?;
                    debug!(format = format.mime(), size = staged.size, "Image staged");
                    form.image = Some(staged);
                }
                _ => {} // Ignore unknown fields.
            }
        }

        Ok(form)
    }
}

/// An uploaded image held in a temp file until the request is known to be valid.
///
/// Dropping it without calling [`StagedImage::commit`] deletes the temp file.
#[derive(Debug)]
pub struct StagedImage {
    path: PathBuf,
    extension: String,
    size: u64,
}

impl StagedImage {
    /// Stream a multipart field to a temp file, enforcing `max_size`.
    async fn stage(
        mut field: Field<'_>,
        extension: String,
        max_size: u64,
    ) -> Result<Self, AppError> {
        let mut staged = StagedImage {
            path: std::env::temp_dir().join(format!("atlas-upload-{}", Uuid::new_v4())),
            extension,
            size: 0,
        };

        let mut temp_file = tokio::fs::File::create(&staged.path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        while let Some(chunk) = field.chunk().await? {
            staged.size += chunk.len() as u64;
            // Keep reading past the limit so the client finishes sending before
            // it gets the rejection.
            if staged.size > max_size {
                continue;
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        if staged.size > max_size {
            return Err(AppError::PayloadTooLarge(format!(
                "Payload too large: images may be at most {max_size} bytes"
            )));
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;

        Ok(staged)
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Move the image into the store, returning its generated name.
    pub async fn commit(self, store: &dyn ImageStore) -> Result<String, AppError> {
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        Ok(store.put_stream(reader, &self.extension).await?)
    }
}

impl Drop for StagedImage {
    fn drop(&mut self) {
        // Best effort.
        let _ = std::fs::remove_file(&self.path);
    }
}
